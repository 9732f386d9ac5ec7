use std::str::FromStr;

use anyhow::Result;
use fern::colors::{Color, ColoredLevelConfig};

/// Builds the stdout+file dispatch used by the running binary.
/// `cfg!(test)` unit tests that exercise this module go through
/// [`build_dispatch`] directly so they never touch the filesystem.
pub fn init(log_level: &str, colored: bool) -> Result<()> {
    build_dispatch(log_level, colored, !cfg!(test))?.apply()?;
    Ok(())
}

fn build_dispatch(log_level: &str, colored: bool, with_file_sink: bool) -> Result<fern::Dispatch> {
    let colors = ColoredLevelConfig::new()
        .trace(Color::Magenta)
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Utc::now().to_rfc3339(),
                if colored {
                    colors.color(record.level()).to_string()
                } else {
                    record.level().to_string()
                },
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::from_str(log_level)?)
        .chain(std::io::stdout());

    if with_file_sink {
        dispatch = dispatch.chain(fern::log_file("cacheproxy.log")?);
    }

    Ok(dispatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_dispatch_without_file_sink_does_not_touch_disk() {
        // with_file_sink=false must never call fern::log_file, so this
        // must succeed even in a read-only or sandboxed working dir.
        assert!(build_dispatch("info", false, false).is_ok());
    }

    #[test]
    fn rejects_unknown_level_filter() {
        assert!(build_dispatch("not-a-level", false, false).is_err());
    }
}
