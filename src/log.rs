use std::fmt::{Debug, Display, Formatter};

/// Verbosity levels for the engine's internal diagnostics.
///
/// There is no `log`/`tracing` dependency here: diagnostics are gated behind
/// `cfg(debug_assertions)` and an explicit ordering, the same way the engine's
/// tokenizer/parser ancestry gates its own `println!` tracing behind a `Log<T>`
/// verbosity enum rather than pulling in a logging facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub(crate) enum Trace {
    #[default]
    None,
    Repair,
    Token,
    Verbose,
}

impl Trace {
    pub(crate) fn order(&self) -> u8 {
        match self {
            Trace::None => 0,
            Trace::Repair => 1,
            Trace::Token => 2,
            Trace::Verbose => 3,
        }
    }

    /// The level configured for this process, read once from
    /// `JSONREPAIR_TRACE` (`repair`, `token`, or `verbose`; anything else,
    /// including unset, is `None`).
    pub(crate) fn current() -> Trace {
        #[cfg(debug_assertions)]
        {
            use std::sync::OnceLock;
            static LEVEL: OnceLock<Trace> = OnceLock::new();
            *LEVEL.get_or_init(|| match std::env::var("JSONREPAIR_TRACE").as_deref() {
                Ok("repair") => Trace::Repair,
                Ok("token") => Trace::Token,
                Ok("verbose") => Trace::Verbose,
                _ => Trace::None,
            })
        }
        #[cfg(not(debug_assertions))]
        {
            Trace::None
        }
    }
}

impl Display for Trace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

/// Emit a diagnostic line to stderr when the process's configured
/// [`Trace::current`] level is at least as verbose as `$min`. Compiled out
/// entirely in release builds.
macro_rules! trace {
    ($min:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            if crate::log::Trace::current().order() >= $min.order() {
                eprintln!($($arg)*);
            }
        }
    };
}

pub(crate) use trace;
