use std::io::{self, Write};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::info;

use courtside::catalog::GameCatalog;
use courtside::config::{PanelConfig, SourceKind};
use courtside::dock::{DockState, EdgeDockController, Geometry, Point};
use courtside::fake_feed::DemoFeed;
use courtside::feed::{FeedSource, Provider};
use courtside::logging;
use courtside::refresh::{Notifier, RefreshCoordinator};
use courtside::scoreboard_fetch::ScoreboardFeed;
use courtside::state::{Delta, Game, GameClass, PanelState, TeamScore, apply_delta};
use courtside::timer;

const CARD_HEIGHT: u16 = 4;

struct TerminalNotifier<'a> {
    attended: bool,
    tx: &'a Sender<Delta>,
}

impl Notifier for TerminalNotifier<'_> {
    fn window_attended(&self) -> bool {
        self.attended
    }

    fn notify(&self, title: &str, body: &str) {
        let _ = self.tx.send(Delta::Alert {
            title: title.to_string(),
            body: body.to_string(),
        });
    }
}

struct App {
    panel: PanelState,
    catalog: GameCatalog,
    refresh: RefreshCoordinator,
    dock: EdgeDockController,
    provider: Provider,
    tx: Sender<Delta>,
    bell: bool,
    show_logs: bool,
    pressed_on_panel: bool,
    should_quit: bool,
}

impl App {
    fn new(config: PanelConfig, display: Geometry, tx: Sender<Delta>) -> Self {
        let source: Arc<dyn FeedSource> = match config.source {
            SourceKind::Live => Arc::new(ScoreboardFeed::new(config.scoreboard_url.clone())),
            SourceKind::Demo => Arc::new(DemoFeed::new()),
        };
        info!(source = ?config.source, url = %config.scoreboard_url, "scoreboard source selected");
        let now = Instant::now();
        let dock = EdgeDockController::new(config.dock, display, tx.clone());
        Self {
            panel: PanelState::new(dock.geometry()),
            catalog: GameCatalog::new(),
            refresh: RefreshCoordinator::new(config.refresh, now, tx.clone()),
            dock,
            provider: Provider::new(source),
            tx,
            bell: config.bell,
            show_logs: false,
            pressed_on_panel: false,
            should_quit: false,
        }
    }

    /// Runs completions and timers for one loop iteration.
    fn pump(&mut self, now: Instant) {
        let notifier = TerminalNotifier {
            attended: self.panel.attended(),
            tx: &self.tx,
        };
        while let Some(completion) = self.provider.try_recv() {
            self.refresh
                .complete(completion, now, &mut self.catalog, &notifier);
        }
        self.refresh.poll(now, &mut self.catalog, &notifier);
        if let Some(ticket) = self.refresh.tick(now) {
            let _ = self.provider.dispatch(ticket);
        }
        self.dock.poll(now);
    }

    fn next_wake(&self, now: Instant, tick_rate: Duration) -> Duration {
        timer::earliest([self.refresh.next_deadline(), self.dock.next_deadline()])
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(tick_rate)
            .min(tick_rate)
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Some(ticket) = self.refresh.request_manual(now) {
                    self.panel.push_log("[INFO] Manual refresh");
                    let _ = self.provider.dispatch(ticket);
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => self.dock.toggle_expanded(),
            KeyCode::Char('m') | KeyCode::Char('M') => self.toggle_minimized(now),
            KeyCode::Char('l') | KeyCode::Char('L') => self.show_logs = !self.show_logs,
            KeyCode::Char('?') => self.panel.help_overlay = !self.panel.help_overlay,
            _ => {}
        }
    }

    fn toggle_minimized(&mut self, now: Instant) {
        self.panel.minimized = !self.panel.minimized;
        if self.panel.minimized {
            self.panel
                .push_log("[INFO] Minimized; final scores will raise alerts");
        } else {
            self.dock.restore_requested(now);
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.panel.minimized {
            return;
        }
        let pos = Point::new(i32::from(mouse.column), i32::from(mouse.row));
        let on_panel = self.panel.panel_rect(now).contains(pos);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if on_panel => {
                self.pressed_on_panel = true;
                self.dock.drag_start(pos, now);
            }
            MouseEventKind::Drag(MouseButton::Left) if self.pressed_on_panel => {
                self.dock.drag_move(pos);
            }
            MouseEventKind::Up(MouseButton::Left) if self.pressed_on_panel => {
                self.pressed_on_panel = false;
                self.dock.drag_end(pos, now);
            }
            MouseEventKind::Moved if on_panel => self.dock.hover_enter(now),
            _ => {}
        }
    }

    fn on_delta(&mut self, delta: Delta) {
        if self.bell && matches!(delta, Delta::Alert { .. }) {
            ring_bell();
        }
        apply_delta(&mut self.panel, delta);
    }
}

fn ring_bell() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = PanelConfig::from_env();
    let log_path = match logging::init() {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!("logging disabled: {err:#}");
            None
        }
    };

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let size = terminal.size()?;
    let display = Geometry::new(0, 0, i32::from(size.width), i32::from(size.height));
    let (tx, rx) = mpsc::channel();
    if let Some(path) = &log_path {
        let _ = tx.send(Delta::Log(format!("[INFO] Logging to {}", path.display())));
    }
    let mut app = App::new(config, display, tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(50);

    loop {
        let now = Instant::now();
        app.pump(now);
        while let Ok(delta) = rx.try_recv() {
            app.on_delta(delta);
        }
        app.panel.expire_toast(now);

        terminal.draw(|f| ui(f, app, now))?;

        if event::poll(app.next_wake(Instant::now(), tick_rate))? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key, now),
                Event::Mouse(mouse) => app.on_mouse(mouse, now),
                Event::FocusGained => app.panel.focused = true,
                Event::FocusLost => app.panel.focused = false,
                Event::Resize(width, height) => app.dock.set_display(Geometry::new(
                    0,
                    0,
                    i32::from(width),
                    i32::from(height),
                )),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App, now: Instant) {
    let area = frame.size();
    render_desktop(frame, area);

    if app.panel.minimized {
        render_tray(frame, area);
    } else if let Some(rect) = clip(app.panel.panel_rect(now), area) {
        match app.panel.dock_state {
            DockState::HiddenAtEdge(_) => render_sliver(frame, rect),
            _ => render_panel(frame, rect, &app.panel),
        }
    }

    if app.show_logs {
        render_logs(frame, area, &app.panel);
    }
    if let Some(toast) = &app.panel.toast {
        render_toast(frame, area, &toast.title, &toast.body);
    }
    if app.panel.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn clip(g: Geometry, area: Rect) -> Option<Rect> {
    let x0 = g.x.max(i32::from(area.x));
    let y0 = g.y.max(i32::from(area.y));
    let x1 = g.right().min(i32::from(area.right()));
    let y1 = g.bottom().min(i32::from(area.bottom()));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(
        x0 as u16,
        y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}

fn render_desktop(frame: &mut Frame, area: Rect) {
    let hint = Paragraph::new("drag the panel near an edge to dock it · ? help")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    let line = Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    };
    frame.render_widget(hint, line);
}

fn render_tray(frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let tray = Paragraph::new(" courtside minimized · m restore ")
        .style(Style::default().fg(Color::Black).bg(Color::Yellow))
        .alignment(Alignment::Right);
    let line = Rect {
        y: area.bottom() - 1,
        height: 1,
        ..area
    };
    frame.render_widget(tray, line);
}

fn render_sliver(frame: &mut Frame, rect: Rect) {
    frame.render_widget(Clear, rect);
    frame.render_widget(Block::default().style(Style::default().bg(Color::Green)), rect);
}

fn render_panel(frame: &mut Frame, rect: Rect, panel: &PanelState) {
    frame.render_widget(Clear, rect);
    let title = match &panel.updated_at {
        Some(at) => format!(" NBA Live · {at} "),
        None => " NBA Live ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray))
        .title(title);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    if inner.height == 0 {
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let status_style = if panel.error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Cyan)
    };
    frame.render_widget(
        Paragraph::new(panel.status_line()).style(status_style),
        sections[0],
    );
    frame.render_widget(
        Paragraph::new("r refresh · e expand · m minimize")
            .style(Style::default().fg(Color::DarkGray)),
        sections[2],
    );

    let list_area = sections[1];
    if panel.refreshing {
        let spinner = Paragraph::new("⟳ refreshing...")
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center);
        frame.render_widget(spinner, list_area);
        return;
    }
    if panel.loaded && panel.games.is_empty() {
        let empty = Paragraph::new("No games today")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = (list_area.height / CARD_HEIGHT) as usize;
    for (i, game) in panel.games.iter().take(visible).enumerate() {
        let card = Rect {
            y: list_area.y + (i as u16) * CARD_HEIGHT,
            height: CARD_HEIGHT,
            ..list_area
        };
        render_card(frame, card, game);
    }
}

fn render_card(frame: &mut Frame, area: Rect, game: &Game) {
    let accent = match game.class() {
        GameClass::Live => Color::Green,
        GameClass::Scheduled => Color::Yellow,
        GameClass::Finished => Color::Gray,
    };
    let marker = if game.is_live() { "● " } else { "" };
    let mut header = vec![Span::styled(
        format!("{marker}{}", game.status_label()),
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )];
    if game.class() == GameClass::Scheduled
        && let Some(local) = game.start_time_local()
    {
        header.push(Span::styled(
            format!("  local {local}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let show_score = game.class() != GameClass::Scheduled;
    let lines = vec![
        Line::from(header),
        team_line(&game.away, show_score, area.width),
        team_line(&game.home, show_score, area.width),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn team_line(team: &TeamScore, show_score: bool, width: u16) -> Line<'static> {
    let score = if show_score {
        team.score.to_string()
    } else {
        "-".to_string()
    };
    let label = format!("{:<3} {} ({})", team.tricode, team.display_name(), team.record());
    let pad = (width as usize).saturating_sub(label.chars().count() + score.len());
    Line::from(vec![
        Span::raw(label),
        Span::raw(" ".repeat(pad)),
        Span::styled(score, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

fn render_logs(frame: &mut Frame, area: Rect, panel: &PanelState) {
    let height = area.height.min(8);
    let rect = Rect {
        x: area.x,
        y: area.bottom() - height,
        width: area.width.min(72),
        height,
    };
    let rows = height.saturating_sub(2) as usize;
    let lines: Vec<Line> = panel
        .logs
        .iter()
        .rev()
        .take(rows)
        .rev()
        .map(|l| Line::from(l.as_str()))
        .collect();
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(" Console ").borders(Borders::ALL)),
        rect,
    );
}

fn render_toast(frame: &mut Frame, area: Rect, title: &str, body: &str) {
    let width = (body.chars().count().max(title.len()) as u16 + 4).min(area.width);
    let height = area.height.min(3);
    let rect = Rect {
        x: area.right().saturating_sub(width),
        y: area.bottom().saturating_sub(height + 1),
        width,
        height,
    };
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(body.to_string()).block(
            Block::default()
                .title(format!(" {title} "))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        ),
        rect,
    );
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Courtside - Help",
        "",
        "Keys:",
        "  r            Refresh now",
        "  e            Expand / collapse",
        "  m            Minimize / restore",
        "  l            Toggle console",
        "  ?            Toggle help",
        "  q / Esc      Quit",
        "",
        "Mouse:",
        "  drag         Move the panel",
        "  release near an edge to auto-hide it",
        "  hover or click the sliver to bring it back",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
