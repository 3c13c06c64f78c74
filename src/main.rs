mod display;

use std::io::{stdout, BufWriter, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::rngs::ThreadRng;
use rand::thread_rng;
use tracing::{error, info};

use display::{TerminalSink, Viewport};
use mosquito_raid::assets::AssetCatalog;
use mosquito_raid::config::{FieldConfig, Level, TICK_PERIOD};
use mosquito_raid::driver::{TickDriver, TickTimer};
use mosquito_raid::state::GameState;
use mosquito_raid::GameResult;

/// Names a file to receive structured logs. Nothing is logged without it,
/// since the terminal itself is busy drawing the game.
const LOG_ENV: &str = "MOSQUITO_RAID_LOG";

fn init_logging() {
    let Ok(path) = std::env::var(LOG_ENV) else {
        return;
    };
    if let Ok(file) = std::fs::File::create(&path) {
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Level),
    Quit,
}

const LEVELS: [(char, Level, Color, &str); 3] = [
    ('1', Level::Easy, Color::Green, "Low skyline, room to manoeuvre"),
    ('2', Level::Medium, Color::Yellow, "Balanced challenge"),
    ('3', Level::Hard, Color::Red, "Towers scrape the clouds"),
];

fn print_centred<W: Write>(out: &mut W, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let (cols, _) = terminal::size()?;
    let col = (cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (_, rows) = terminal::size()?;
    let mid = rows / 2;

    print_centred(out, mid.saturating_sub(6), "☁  MOSQUITO  RAID  ☁", Color::Cyan)?;
    print_centred(
        out,
        mid.saturating_sub(5),
        "Wash every mosquito off the rooftops before the cloud sinks into them.",
        Color::DarkGrey,
    )?;
    print_centred(out, mid.saturating_sub(3), "Select difficulty:", Color::White)?;
    for (offset, (key, level, color, blurb)) in LEVELS.iter().enumerate() {
        let line = format!("[{key}] {:<8} - {blurb}", format!("{level:?}"));
        print_centred(out, mid.saturating_sub(1) + offset as u16, &line, *color)?;
    }
    print_centred(
        out,
        mid + 3,
        "SPACE / click cloud : Drop   P : Pause   Q : Quit",
        Color::DarkGrey,
    )?;
    out.queue(style::ResetColor)?;
    out.flush()?;

    while let Ok(ev) = rx.recv() {
        let Event::Key(KeyEvent { code: KeyCode::Char(c), kind: KeyEventKind::Press, .. }) = ev else {
            if let Event::Key(KeyEvent { code: KeyCode::Esc, .. }) = ev {
                return Ok(MenuResult::Quit);
            }
            continue;
        };
        if c.eq_ignore_ascii_case(&'q') {
            return Ok(MenuResult::Quit);
        }
        if let Some((_, level, _, _)) = LEVELS.iter().find(|(key, ..)| *key == c) {
            return Ok(MenuResult::Start(*level));
        }
    }
    // Input thread gone
    Ok(MenuResult::Quit)
}

// ── Input ─────────────────────────────────────────────────────────────────────

enum Flow {
    Continue,
    Menu,
    Quit,
}

/// Maps one terminal event onto state operations. Key and pointer drops both
/// go through `request_drop`, so the pass budget applies to either.
fn handle_event(
    ev: Event,
    state: &mut GameState,
    rng: &mut ThreadRng,
    catalog: &AssetCatalog,
) -> GameResult<Flow> {
    match ev {
        Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) => match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(Flow::Quit),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(Flow::Quit)
            }
            KeyCode::Char('m') | KeyCode::Char('M') => return Ok(Flow::Menu),
            KeyCode::Char(' ') => {
                state.request_drop(Instant::now());
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                state.toggle_pause();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                state.reset_game();
                state.build_scene(catalog, rng)?;
            }
            _ => {}
        },
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => {
            let (x, y) = Viewport::current(&state.field)?.to_field(column, row);
            if state.cloud().contains(x, y) {
                state.request_drop(Instant::now());
            }
        }
        _ => {}
    }
    Ok(Flow::Continue)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program, `false` → back to menu.
///
/// Input events are drained between ticks and applied immediately; ticks come
/// from a `TickTimer` that drops, rather than queues, ticks that arrive while
/// the previous one is still being processed. The timer is stopped when this
/// function returns, however it returns.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    level: Level,
    catalog: &AssetCatalog,
) -> GameResult<bool> {
    let mut rng = thread_rng();
    let mut state = GameState::new(FieldConfig::with_level(level));
    state.build_scene(catalog, &mut rng)?;

    let mut driver = TickDriver::new(&state);
    let mut sink = TerminalSink::new(out, catalog, level);
    let timer = TickTimer::start(TICK_PERIOD);

    loop {
        while let Ok(ev) = rx.try_recv() {
            match handle_event(ev, &mut state, &mut rng, catalog)? {
                Flow::Continue => {}
                Flow::Menu => return Ok(false),
                Flow::Quit => {
                    info!(ticks = driver.ticks(), dropped = timer.dropped_ticks(), "session closed");
                    return Ok(true);
                }
            }
        }

        if let Some(now) = timer.recv_timeout(TICK_PERIOD * 2) {
            driver.tick(&mut state, now, &mut sink);
            if let Some(err) = sink.take_error() {
                return Err(err.into());
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> GameResult<()> {
    init_logging();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Blocking reads stay on their own thread; the loop only polls the channel.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = run(&mut out, &rx);
    if let Err(err) = &result {
        error!(%err, "game aborted");
    }

    // Restore regardless of how the session ended
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> GameResult<()> {
    // Every sprite is resolved up front; a partial catalog never reaches the loop.
    let catalog = AssetCatalog::builtin();
    mosquito_raid::assets::validate(&catalog)?;

    loop {
        match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start(level) => {
                if game_loop(out, rx, level, &catalog)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
