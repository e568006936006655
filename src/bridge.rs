// src/bridge.rs
//! Line protocol spoken by the `numeral_engine` binary.
//!
//! A host describes fields and keystrokes one command per line and reads
//! replies back:
//!
//! ```text
//! FIELD <type> [name]   -> FIELD <id>
//! TYPE <id> <text>
//! PASTE <id> <text>
//! TICK <ms>
//! VALUE <id>            -> VALUE <id> <caret> <value>
//! CONVERT <text>        -> CONVERTED <text>
//! EXIT
//! ```
//!
//! Every `change` event raised while a command runs is reported afterwards
//! as `CHANGE <id>`. A failing command answers `ERROR <reason>`.

use crate::core::converter::convert;
use crate::core::engine::NumeralEngine;
use crate::core::types::{EventKind, NodeId};
use crate::dom::{Event, Page};
use crate::error::{NumeralError, Result};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

pub struct Bridge {
    page: Page,
    form: NodeId,
    changes: Rc<RefCell<Vec<NodeId>>>,
}

impl Bridge {
    /// Builds a page holding one empty `<form>` and installs `engine` on it.
    pub fn new(engine: &mut NumeralEngine) -> Result<Self> {
        let mut page = Page::default();
        let form = page.document_mut().create_element("form");
        let body = page.document().body().ok_or(NumeralError::MissingBody)?;
        page.append_child(body, form)?;
        engine.install(&mut page)?;

        let changes: Rc<RefCell<Vec<NodeId>>> = Rc::default();
        let sink = Rc::clone(&changes);
        page.add_document_listener(
            EventKind::Change,
            Rc::new(move |_: &mut Page, event: &Event| sink.borrow_mut().push(event.target)),
        );

        Ok(Self { page, form, changes })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Runs one command and writes its replies to `out`. Returns `false`
    /// once the host sent `EXIT`. Only write failures are returned as
    /// errors; a bad command is answered with an `ERROR` line.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<bool> {
        tracing::debug!("<- {:?}", line);
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        let result = match command {
            "EXIT" => return Ok(false),
            "" => Ok(()),
            "FIELD" => self.add_field(rest, out),
            "TYPE" => split_field(rest).and_then(|(field, text)| self.page.type_text(field, text)),
            "PASTE" => split_field(rest).and_then(|(field, text)| self.page.paste_text(field, text)),
            "TICK" => parse_millis(rest).map(|by| self.page.advance(by)),
            "VALUE" => self.report_value(rest, out),
            "CONVERT" => writeln!(out, "CONVERTED {}", convert(rest)).map_err(Into::into),
            other => Err(NumeralError::Protocol(format!("unknown command {other:?}"))),
        };

        match result {
            Ok(()) => {}
            Err(NumeralError::Io(e)) => return Err(NumeralError::Io(e)),
            Err(e) => {
                tracing::warn!("command {:?} failed: {}", line, e);
                writeln!(out, "ERROR {e}")?;
            }
        }
        for field in self.changes.borrow_mut().drain(..) {
            writeln!(out, "CHANGE {field}")?;
        }
        out.flush()?;
        Ok(true)
    }

    fn add_field(&mut self, rest: &str, out: &mut impl Write) -> Result<()> {
        let mut parts = rest.split_whitespace();
        let input_type = parts
            .next()
            .ok_or_else(|| NumeralError::Protocol("FIELD expects a type".to_string()))?;
        let input = self.page.document_mut().create_element("input");
        self.page.document_mut().set_attribute(input, "type", input_type)?;
        if let Some(name) = parts.next() {
            self.page.document_mut().set_attribute(input, "name", name)?;
        }
        self.page.append_child(self.form, input)?;
        writeln!(out, "FIELD {input}")?;
        Ok(())
    }

    fn report_value(&self, rest: &str, out: &mut impl Write) -> Result<()> {
        let field = parse_field(rest.trim())?;
        let el = self
            .page
            .document()
            .element(field)
            .ok_or(NumeralError::UnknownNode(field))?;
        writeln!(out, "VALUE {field} {} {}", el.selection_start(), el.value())?;
        Ok(())
    }
}

fn parse_field(raw: &str) -> Result<NodeId> {
    raw.parse::<usize>()
        .map(NodeId)
        .map_err(|_| NumeralError::Protocol(format!("invalid field id {raw:?}")))
}

fn split_field(rest: &str) -> Result<(NodeId, &str)> {
    let (id, text) = rest.split_once(' ').unwrap_or((rest, ""));
    Ok((parse_field(id)?, text))
}

fn parse_millis(rest: &str) -> Result<Duration> {
    rest.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| NumeralError::Protocol(format!("TICK expects milliseconds, got {rest:?}")))
}
