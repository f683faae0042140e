//! Format engine
//!
//! Renders the current instant with a named template.

use std::fmt::{Display, Write};

use chrono::{DateTime, Local, TimeZone};

use crate::datetime::templates::TemplateTable;
use crate::error::FormatError;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Host clock in the process's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Formats timestamps from a validated template table
#[derive(Debug, Clone)]
pub struct DatetimeFormatter<C = SystemClock> {
    table: TemplateTable,
    clock: C,
}

impl DatetimeFormatter<SystemClock> {
    /// Create a formatter reading the system clock
    pub fn new(table: TemplateTable) -> Self {
        Self::with_clock(table, SystemClock)
    }
}

impl<C: Clock> DatetimeFormatter<C> {
    /// Create a formatter with a custom clock
    pub fn with_clock(table: TemplateTable, clock: C) -> Self {
        Self { table, clock }
    }

    /// The template table backing this formatter
    pub fn table(&self) -> &TemplateTable {
        &self.table
    }

    /// Render the current instant with the named template
    pub fn format(&self, format: &str) -> Result<String, FormatError> {
        self.render(format, &self.clock.now())
    }

    /// Render an explicit instant with the named template
    pub fn render<Tz>(&self, format: &str, instant: &DateTime<Tz>) -> Result<String, FormatError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut out = String::new();
        self.render_to(&mut out, format, instant)?;
        Ok(out)
    }

    /// Render an explicit instant into any `fmt::Write` sink
    ///
    /// A sink or chrono failure is logged and returned as
    /// `FormatError::Formatting`. `render` drops its buffer on that path, so
    /// callers never see a partial string.
    pub fn render_to<W, Tz>(
        &self,
        out: &mut W,
        format: &str,
        instant: &DateTime<Tz>,
    ) -> Result<(), FormatError>
    where
        W: Write,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let template = self.table.get(format)?;

        write!(out, "{}", instant.format_with_items(template.items().iter())).map_err(|e| {
            tracing::error!(format, pattern = template.pattern, "Format error: {}", e);
            FormatError::Formatting {
                format: format.to_string(),
                message: e.to_string(),
            }
        })
    }
}
