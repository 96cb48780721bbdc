use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static LOGGING: OnceCell<()> = OnceCell::new();

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// 安装全局 fmt subscriber；`RUST_LOG` 优先于传入的级别。重复调用无副作用。
pub fn init_logging(default_level: &str) {
    LOGGING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        if let Err(err) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
        {
            eprintln!("[logging] subscriber already installed: {err}");
        }
    });
}
