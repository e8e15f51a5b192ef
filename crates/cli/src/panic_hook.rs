//! Functions for installing a custom panic hook.

use std::panic::PanicHookInfo;

const BUG_REPORT_URL: &str =
    "https://github.com/talon-lang/talon/issues/new/?labels=C-bug%2C+I-ICE";

/// Install the compiler's default panic hook.
pub fn install() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // Lock stderr to prevent interleaving of concurrent panics.
        let _guard = std::io::stderr().lock();

        default_hook(info);

        // Separate the output with an empty line.
        eprintln!();

        panic_hook(info);
    }));
}

fn panic_hook(info: &PanicHookInfo<'_>) {
    // `bug!` already says what went wrong.
    if !payload_str(info).is_some_and(|msg| msg.starts_with("internal compiler error")) {
        eprintln!("error: the compiler unexpectedly panicked; this is a bug.");
    }
    eprintln!("note: we would appreciate a bug report: {BUG_REPORT_URL}");
}

fn payload_str<'a>(info: &'a PanicHookInfo<'_>) -> Option<&'a str> {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}
