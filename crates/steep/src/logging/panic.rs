use super::config::PanicConfig;
use std::sync::Once;

static PANIC_HOOK_INIT: Once = Once::new();

/// Installs a panic hook logging the panic before unwinding closes the
/// open spans. Only the first call has an effect.
pub(super) fn install_panic_hook(config: PanicConfig) {
    PANIC_HOOK_INIT.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            if config.show {
                if config.show_message {
                    tracing::error!("PANIC: {}", panic_info);
                } else {
                    tracing::error!("PANIC occurred!");
                }
            }
            if config.show_default_hook {
                default_hook(panic_info);
            }
        }));
    });
}
