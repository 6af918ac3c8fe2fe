use clap::Parser;
use nanny_config::ConfigLoader;
use nanny_control::{CommandChannel, MpscCommandChannel};
use nanny_device::DeviceRegistry;
use nanny_engine::{EventBus, MessageDispatcher, UpdateEngine};
use nanny_server::{
    api,
    config::EmulatorConfig,
    emulator::{EmulatedLab, Emulator},
    logging, metrics, presenter,
    runtime::spawn_engine,
    shutdown,
    transport, AppConfig, AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server config file path
    #[arg(short, long, default_value = "nanny.toml")]
    config: String,

    /// Directory holding global.toml and labs.toml
    #[arg(long, default_value = "./config")]
    config_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;

    logging::init_logging(&config.logging)?;
    tracing::info!("Starting lab nanny with config: {}", args.config);

    if config.metrics.enabled {
        metrics::init_metrics(config.metrics.addr)?;
    }

    let dashboard = ConfigLoader::new(&args.config_dir).load_dashboard()?;
    tracing::info!(
        system = %dashboard.global.system.name,
        labs = dashboard.registry.len(),
        "Dashboard loaded"
    );

    let emulated_labs = emulated_labs(&config.emulator, &dashboard.registry);

    // 事件总线与展示适配器
    let event_bus = Arc::new(EventBus::new(config.eventbus.capacity));
    tokio::spawn(presenter::run_presenter(event_bus.subscribe()));

    // 指令输出
    let (channel, commands) = MpscCommandChannel::new();
    let channel: Arc<dyn CommandChannel> = Arc::new(channel);
    let format = config.transport.command_format;
    tokio::spawn(async move {
        if let Err(e) = transport::run_command_writer(commands, tokio::io::stdout(), format).await
        {
            tracing::error!("Command writer failed: {}", e);
        }
    });

    // 引擎 actor
    let engine = UpdateEngine::new(dashboard.registry, channel, event_bus)
        .with_disconnected_flag(dashboard.global.dashboard.disconnected_flag);
    let (handle, _engine_task) = spawn_engine(MessageDispatcher::new(engine));

    if config.transport.stdin {
        let reader_handle = handle.clone();
        tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            if let Err(e) = transport::run_telemetry_reader(stdin, reader_handle).await {
                tracing::error!("Telemetry reader failed: {}", e);
            }
        });
    }

    if config.emulator.enabled {
        let emulator = Emulator::new(
            emulated_labs,
            Duration::from_millis(config.emulator.period_ms),
        );
        tokio::spawn(emulator.run(handle.clone()));
    }

    let state = Arc::new(AppState { engine: handle });
    let app = api::create_router(state);

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown::wait_for_shutdown(tokio::signal::ctrl_c()))
        .await?;

    tracing::info!("Lab nanny stopped");
    Ok(())
}

fn emulated_labs(config: &EmulatorConfig, registry: &DeviceRegistry) -> Vec<EmulatedLab> {
    registry
        .ids()
        .into_iter()
        .filter(|id| config.labs.is_empty() || config.labs.contains(id))
        .filter_map(|id| {
            let device = registry.get(&id)?;
            let channels = if config.channels.is_empty() {
                device.channels().to_vec()
            } else {
                config.channels.clone()
            };
            Some(EmulatedLab { id, channels })
        })
        .collect()
}
