//! GPIO bridge: main entry point
//!
//! Network-controlled Raspberry Pi GPIO with an L298N motor driver.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                    │
//! │                                                          │
//! │  rpc::server (tokio TCP)   JsonFileConfig   RpiDriver    │
//! │                            (ConfigPort)     / SimDriver  │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ────────────────   │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │           AppService (pure logic)                  │  │
//! │  │  PinController · PwmChannels · MotorDrive          │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use tokio::net::TcpListener;

use gpio_bridge::adapters::config_file::JsonFileConfig;
use gpio_bridge::app::ports::{ConfigPort, HardwareDriver};
use gpio_bridge::app::service::AppService;
use gpio_bridge::config::SystemConfig;
use gpio_bridge::pins;
use gpio_bridge::rpc::engine::RpcEngine;
use gpio_bridge::rpc::server;

#[derive(Parser)]
#[command(name = "gpio-bridge", version, about = "Network-controlled Raspberry Pi GPIO")]
struct Cli {
    #[arg(long, short, help = "JSON config file (defaults are used if absent)")]
    config: Option<PathBuf>,
    #[arg(long, short, help = "Override the listen address, e.g. 0.0.0.0:3001")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = Env::default().filter_or("LOG_LEVEL", "info");
    env_logger::init_from_env(env);

    let cli = Cli::parse();

    let mut config = JsonFileConfig::new(cli.config).load()?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    #[cfg(feature = "rpi")]
    let hw = gpio_bridge::adapters::rpi::RpiDriver::new()
        .context("opening the GPIO peripheral")?;
    #[cfg(not(feature = "rpi"))]
    let hw = {
        warn!("Built without the `rpi` feature: using the simulated GPIO driver");
        gpio_bridge::adapters::sim::SimDriver::new()
    };

    run(hw, config).await
}

async fn run<D>(hw: D, config: SystemConfig) -> Result<()>
where
    D: HardwareDriver + Send + 'static,
{
    info!("========================================");
    info!("GPIO bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("Controllable pins: {:?}", pins::VALID_PINS);
    info!(
        "Left motor: ENA={} IN1={} IN2={}",
        config.motors.left.enable, config.motors.left.forward, config.motors.left.backward
    );
    info!(
        "Right motor: ENB={} IN3={} IN4={}",
        config.motors.right.enable, config.motors.right.forward, config.motors.right.backward
    );
    info!("PWM frequency: {} Hz", config.pwm_frequency_hz);
    info!("========================================");

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    let app = Arc::new(AppService::new(hw, &config));
    let engine = Arc::new(RpcEngine::new(Arc::clone(&app)));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler failed: {}; running until killed", e);
            std::future::pending::<()>().await;
        }
    };

    let served = server::serve(listener, engine, config.max_frame_bytes, shutdown).await;

    app.shutdown();
    served.context("RPC server")
}
