use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the timed env logger once per process. `RUST_LOG` overrides the
/// default of debug output for this crate only.
pub fn setup_logger() {
    INIT.call_once(|| {
        let mut builder = pretty_env_logger::formatted_timed_builder();
        match std::env::var("RUST_LOG") {
            Ok(filters) => builder.parse_filters(&filters),
            Err(_) => builder.filter_module("usb_mic_emu", log::LevelFilter::Debug),
        };
        // a logger may already be installed by the embedding emulator
        let _ = builder.is_test(cfg!(test)).try_init();
    });
}
