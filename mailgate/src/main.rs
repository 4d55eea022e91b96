use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use args::Args;
use clap::Parser;
use config::{Config, SmtpSecurity};
use server::ServeConfig;

mod args;
mod logger;

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 3000));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(&args);

    let config = args.config()?;

    for warning in mail_setup_warnings(&config) {
        log::warn!("{warning}");
    }

    if let Err(e) = server::serve(serve_config(&args, config)).await {
        log::error!("Server failed to start: {e}");
        std::process::exit(1);
    }

    Ok(())
}

/// Problems with `[mail]` that still let the server start.
fn mail_setup_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Err(e) = config.validate() {
        warnings.push(format!("Mail delivery will fail until configured: {e}"));
    }

    if config.mail.security == SmtpSecurity::None && config.mail.password.is_some() {
        warnings.push(format!(
            "Relay credentials for {} are sent unencrypted, set [mail] security to \"starttls\" or \"tls\"",
            config.mail.host
        ));
    }

    warnings
}

fn serve_config(args: &Args, config: Config) -> ServeConfig {
    let listen_address = args
        .listen_address
        .or(config.server.listen_address)
        .unwrap_or(DEFAULT_LISTEN_ADDRESS);

    ServeConfig { listen_address, config }
}
