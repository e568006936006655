// Interactive form simulator for the digit normalizer.
//
// Keys: Tab switch field, F2 toggle Arabic keyboard layout, F3 insert a new
// phone field, Ctrl+V paste a sample number, Left/Right move, Backspace
// delete, Esc quit.
use crossterm::{
    cursor::MoveTo,
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Print, Stylize},
    terminal::{self, Clear, ClearType},
};
use numeral_core::config::{NormalizerConfig, DEFAULT_CONFIG_PATH};
use numeral_core::core::types::{EventKind, NodeId};
use numeral_core::dom::{Event, Page};
use numeral_core::{DigitMap, NumeralEngine};
use std::cell::Cell;
use std::io::{self, Stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

const SAMPLE_CLIPBOARD: &str = "٠٥٠-١٢٣-٤٥٦٧";
const TICK: Duration = Duration::from_millis(20);

struct Form {
    page: Page,
    form: NodeId,
    fields: Vec<(String, NodeId)>,
    focused: usize,
    arabic_layout: bool,
    changes: Rc<Cell<u64>>,
}

impl Form {
    fn new() -> anyhow::Result<Self> {
        let mut page = Page::default();
        let body = page
            .document()
            .body()
            .ok_or(numeral_core::NumeralError::MissingBody)?;
        let form = page.document_mut().create_element("form");
        page.append_child(body, form)?;

        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        page.add_event_listener(
            form,
            EventKind::Change,
            Rc::new(move |_: &mut Page, _: &Event| counter.set(counter.get() + 1)),
        );

        let mut this = Self {
            page,
            form,
            fields: Vec::new(),
            focused: 0,
            arabic_layout: true,
            changes,
        };
        this.add_field("tel", "phone")?;
        this.add_field("number", "quantity")?;
        this.add_field("email", "contact_email")?;
        Ok(this)
    }

    fn add_field(&mut self, input_type: &str, name: &str) -> anyhow::Result<NodeId> {
        let doc = self.page.document_mut();
        let input = doc.create_element("input");
        doc.set_attribute(input, "type", input_type)?;
        doc.set_attribute(input, "name", name)?;
        self.page.append_child(self.form, input)?;
        self.fields.push((format!("{name} ({input_type})"), input));
        Ok(input)
    }

    fn focused_field(&self) -> NodeId {
        self.fields[self.focused].1
    }

    fn type_char(&mut self, c: char) -> anyhow::Result<()> {
        let c = match (self.arabic_layout, c.to_digit(10)) {
            (true, Some(d)) => DigitMap::global()
                .iter()
                .nth(d as usize)
                .map(|(arabic, _)| arabic)
                .unwrap_or(c),
            _ => c,
        };
        let field = self.focused_field();
        self.page.type_text(field, &c.to_string())?;
        Ok(())
    }

    fn move_caret(&mut self, delta: isize) {
        let field = self.focused_field();
        if let Some(el) = self.page.document_mut().element_mut(field) {
            let caret = el.selection_start().saturating_add_signed(delta);
            el.set_selection_range(caret, caret);
        }
    }

    fn backspace(&mut self) {
        let field = self.focused_field();
        if let Some(el) = self.page.document_mut().element_mut(field) {
            let caret = el.selection_start();
            if caret > 0 {
                el.set_selection_range(caret - 1, caret);
                el.insert_at_caret("");
            }
        }
        self.page.dispatch_event(field, EventKind::Input, true);
    }
}

fn render(out: &mut Stdout, form: &Form, engine: &NumeralEngine) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    queue!(out, Print("Arabic-Indic digit normalizer simulator".bold()), Print("\r\n"))?;
    queue!(
        out,
        Print("Tab: next field  F2: layout  F3: add field  Ctrl+V: paste  Esc: quit\r\n\r\n")
    )?;

    let normalizer = engine.normalizer();
    for (i, (label, field)) in form.fields.iter().enumerate() {
        let Some(el) = form.page.document().element(*field) else {
            continue;
        };
        let value: String = el.value().chars().collect();
        let caret = el.selection_start();
        let mut shown: String = value.chars().take(caret).collect();
        if i == form.focused {
            shown.push('|');
        }
        shown.extend(value.chars().skip(caret));

        let attached = if normalizer.is_attached(form.page.document(), *field) {
            "normalized".green()
        } else {
            "untouched".dark_grey()
        };
        let marker = if i == form.focused { ">" } else { " " };
        queue!(
            out,
            Print(format!("{marker} {label:<28} [{shown}] ")),
            Print(attached),
            Print("\r\n")
        )?;
    }

    queue!(
        out,
        Print(format!(
            "\r\nlayout: {}  passes: {}  rewrites: {}  change events: {}  pending timers: {}\r\n",
            if form.arabic_layout { "arabic" } else { "latin" },
            normalizer.passes(),
            normalizer.rewrites(),
            form.changes.get(),
            form.page.pending_timers(),
        ))
    )?;
    out.flush()
}

fn handle_key(form: &mut Form, key: KeyEvent) -> anyhow::Result<bool> {
    if key.kind != KeyEventKind::Press {
        return Ok(true);
    }
    match key.code {
        KeyCode::Esc => return Ok(false),
        KeyCode::Tab => form.focused = (form.focused + 1) % form.fields.len(),
        KeyCode::F(2) => form.arabic_layout = !form.arabic_layout,
        KeyCode::F(3) => {
            let name = format!("extra_phone_{}", form.fields.len());
            form.add_field("tel", &name)?;
            form.focused = form.fields.len() - 1;
        }
        KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let field = form.focused_field();
            form.page.paste_text(field, SAMPLE_CLIPBOARD)?;
        }
        KeyCode::Left => form.move_caret(-1),
        KeyCode::Right => form.move_caret(1),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.type_char(c)?,
        _ => {}
    }
    Ok(true)
}

fn run(out: &mut Stdout, form: &mut Form, engine: &NumeralEngine) -> anyhow::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        render(out, form, engine)?;
        if event::poll(TICK)? {
            if let TermEvent::Key(key) = event::read()? {
                if !handle_key(form, key)? {
                    return Ok(());
                }
            }
        }
        let elapsed = last_tick.elapsed();
        last_tick = Instant::now();
        form.page.advance(elapsed);
    }
}

fn main() -> anyhow::Result<()> {
    // The terminal is taken over, so logs only go to a file when asked for.
    if let Ok(path) = std::env::var("NUMERAL_SIM_LOG") {
        let file = std::fs::File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("numeral_core=debug")),
            )
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    }

    let mut engine = NumeralEngine::from_file_or_default(DEFAULT_CONFIG_PATH);
    if engine.config() != &NormalizerConfig::default() {
        tracing::info!("simulating with config {:?}", engine.config());
    }
    let mut form = Form::new()?;
    engine.install(&mut form.page)?;

    let mut out = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(out, terminal::EnterAlternateScreen)?;
    let result = run(&mut out, &mut form, &engine);
    execute!(out, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    engine.shutdown(&mut form.page);
    result
}
