use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Event format wrapping each field in brackets.
/// Format: [TIMESTAMP] [LEVEL] [SPAN] [TARGET: FILE:LINE]: MESSAGE
///
/// SPAN is the innermost span (`acquisition`, `patch_folder`) followed by its
/// fields, so every line names the folder it belongs to.
pub struct BracketedFormatter;

impl<S, N> FormatEvent<S, N> for BracketedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let now = chrono::Local::now();
        write!(writer, "[{}]  ", now.format("%Y-%m-%dT%H:%M:%S%.6f"))?;

        write!(writer, "[{:5}] ", metadata.level())?;

        match ctx.event_scope().and_then(|scope| scope.from_root().last()) {
            Some(span) => {
                let extensions = span.extensions();
                let fields = extensions
                    .get::<tracing_subscriber::fmt::FormattedFields<N>>()
                    .map(|f| f.as_str())
                    .unwrap_or("");
                if fields.is_empty() {
                    write!(writer, "[{}] ", span.name())?;
                } else {
                    write!(writer, "[{} {}] ", span.name(), fields)?;
                }
            }
            None => {
                let module = metadata.target().rsplit("::").next().unwrap_or("unknown");
                write!(writer, "[{}] ", module)?;
            }
        }

        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            write!(writer, "[{}: {}:{}]: ", metadata.target(), file, line)?;
        } else {
            write!(writer, "[{}]: ", metadata.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}
