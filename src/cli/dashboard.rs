use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, error, info, warn};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Sparkline},
};
use std::{
    collections::VecDeque,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::cli::handlers::link_speed_label;
use crate::collectors::adapters::{AdapterDescriptor, AdapterId};
use crate::collectors::throughput::{
    ThroughputEngine, ThroughputRate, UnitMode, format_speed, tooltip_text, tray_label,
};

const HISTORY_LEN: usize = 60;

/// Real-time terminal dashboard for the primary adapter's throughput
pub struct Dashboard {
    engine: Arc<ThroughputEngine>,
    /// How often to take a sample
    update_interval: Duration,
    /// Current display unit, cycled with `u`
    unit: UnitMode,
    /// Most recent sample
    current_rate: ThroughputRate,
    /// Adapter the engine is currently sampling
    active_adapter: Option<AdapterId>,
    /// Adapter list from the last refresh
    adapters: Vec<AdapterDescriptor>,
    /// Recent download/upload samples for the sparklines
    download_history: VecDeque<u64>,
    upload_history: VecDeque<u64>,
    /// Error message shown in the status panel
    error_message: Option<String>,
    samples_taken: u64,
    last_sample: Option<Instant>,
}

impl Dashboard {
    pub fn new(engine: Arc<ThroughputEngine>, update_interval: Duration, unit: UnitMode) -> Self {
        Self {
            engine,
            update_interval,
            unit,
            current_rate: ThroughputRate::ZERO,
            active_adapter: None,
            adapters: Vec::new(),
            download_history: VecDeque::with_capacity(HISTORY_LEN),
            upload_history: VecDeque::with_capacity(HISTORY_LEN),
            error_message: None,
            samples_taken: 0,
            last_sample: None,
        }
    }

    /// Sets up the terminal, runs the UI loop and restores the terminal on exit
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Starting live dashboard with update interval {}s, unit '{}'",
            self.update_interval.as_secs(),
            self.unit
        );

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_app(&mut terminal).await;

        debug!("Restoring terminal state");
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        if let Err(err) = res {
            error!("Dashboard error: {err:?}");
            eprintln!("Error: {err:?}");
        } else {
            info!("Dashboard exited after {} samples", self.samples_taken);
        }

        Ok(())
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B::Error: Send + Sync + 'static,
    {
        self.refresh_adapters().await;
        // The first cycle only establishes the counter baseline
        self.take_sample().await;
        let mut last_update = Instant::now();

        loop {
            terminal.draw(|f| self.ui(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key.code).await {
                        return Ok(());
                    }
                }
            }

            if last_update.elapsed() >= self.update_interval {
                self.take_sample().await;
                last_update = Instant::now();
            }
        }
    }

    /// Applies one key press; returns true when the dashboard should exit
    async fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('u') => {
                self.unit = self.unit.next();
                debug!("Display unit switched to '{}'", self.unit);
            }
            KeyCode::Char('r') => self.refresh_adapters().await,
            _ => {}
        }
        false
    }

    async fn take_sample(&mut self) {
        // A tick that overlaps an in-flight cycle is dropped
        let Some(report) = self.engine.try_sample_once_detailed().await else {
            return;
        };
        let rate = report.rate;

        self.current_rate = rate;
        self.active_adapter = report.adapter;
        self.samples_taken += 1;
        self.last_sample = Some(Instant::now());

        self.download_history.push_back(rate.down);
        self.upload_history.push_back(rate.up);
        if self.download_history.len() > HISTORY_LEN {
            self.download_history.pop_front();
        }
        if self.upload_history.len() > HISTORY_LEN {
            self.upload_history.pop_front();
        }
    }

    async fn refresh_adapters(&mut self) {
        match self.engine.catalog().list_adapters().await {
            Ok(adapters) => {
                debug!("Adapter list refreshed: {} adapters", adapters.len());
                self.adapters = adapters;
                self.error_message = None;
            }
            Err(e) => {
                warn!("Adapter list refresh failed: {}", e);
                self.error_message = Some(format!("Adapter enumeration failed: {}", e));
            }
        }
    }

    fn ui(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(
                [
                    Constraint::Length(3), // Header
                    Constraint::Length(3), // Status
                    Constraint::Length(6), // Current speed
                    Constraint::Length(5), // Sparklines
                    Constraint::Min(6),    // Adapter list
                    Constraint::Length(2), // Footer
                ]
                .as_ref(),
            )
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.render_current_speed(frame, chunks[2]);
        self.render_sparklines(frame, chunks[3]);
        self.render_adapter_list(frame, chunks[4]);
        self.render_footer(frame, chunks[5]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header = vec![Line::from(vec![
            Span::raw("Netspeed Watcher - Live"),
            Span::raw("    "),
            Span::styled(
                Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                Style::default().fg(Color::Yellow),
            ),
        ])];

        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::White));

        let paragraph = Paragraph::new(header).block(block);
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let status = if let Some(error) = &self.error_message {
            Line::from(vec![
                Span::styled("! ", Style::default().fg(Color::Yellow)),
                Span::styled(error.clone(), Style::default().fg(Color::Yellow)),
            ])
        } else if self.samples_taken < 2 {
            Line::from(vec![
                Span::styled("… ", Style::default().fg(Color::Blue)),
                Span::raw("Establishing counter baseline..."),
            ])
        } else {
            let age = self
                .last_sample
                .map(|t| format!("{:.1}s ago", t.elapsed().as_secs_f32()))
                .unwrap_or_else(|| "never".to_string());
            Line::from(vec![
                Span::styled("✓ ", Style::default().fg(Color::Green)),
                Span::raw("Sampling | "),
                Span::styled(
                    format!("Samples: {} | Last: {}", self.samples_taken, age),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        };

        let block = Block::default().borders(Borders::ALL).title("Status");
        frame.render_widget(Paragraph::new(status).block(block), area);
    }

    fn render_current_speed(&self, frame: &mut Frame, area: Rect) {
        let adapter = self
            .active_adapter
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".to_string());

        let speed_text = vec![
            Line::from(vec![
                Span::raw("Current Speed: "),
                Span::styled(
                    format!("↓ {}", format_speed(self.current_rate.down, self.unit)),
                    Style::default().fg(Color::Green),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("↑ {}", format_speed(self.current_rate.up, self.unit)),
                    Style::default().fg(Color::Blue),
                ),
            ]),
            Line::from(vec![
                Span::raw("Tray: "),
                Span::styled(tray_label(self.current_rate), Style::default().fg(Color::Cyan)),
                Span::raw("   Tooltip: "),
                Span::raw(tooltip_text(self.current_rate, self.unit)),
            ]),
            Line::from(vec![
                Span::raw("Unit: "),
                Span::styled(self.unit.to_string(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("   Primary adapter: "),
                Span::styled(adapter, Style::default().fg(Color::Cyan)),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Throughput")
            .style(Style::default().fg(Color::White));

        frame.render_widget(Paragraph::new(speed_text).block(block), area);
    }

    fn render_sparklines(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
            .split(area);

        let download_data: Vec<u64> = self.download_history.iter().copied().collect();
        let upload_data: Vec<u64> = self.upload_history.iter().copied().collect();

        let download_sparkline = Sparkline::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Download")
                    .title_style(Style::default().fg(Color::Green)),
            )
            .data(&download_data)
            .max(download_data.iter().max().copied().unwrap_or(1).max(1))
            .style(Style::default().fg(Color::Green));

        let upload_sparkline = Sparkline::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Upload")
                    .title_style(Style::default().fg(Color::Blue)),
            )
            .data(&upload_data)
            .max(upload_data.iter().max().copied().unwrap_or(1).max(1))
            .style(Style::default().fg(Color::Blue));

        frame.render_widget(download_sparkline, chunks[0]);
        frame.render_widget(upload_sparkline, chunks[1]);
    }

    fn render_adapter_list(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .adapters
            .iter()
            .map(|adapter| {
                let is_active = self.active_adapter.as_ref() == Some(&adapter.id);
                let name_style = if is_active {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                let addresses = adapter
                    .ipv4_addresses
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");

                ListItem::new(Line::from(vec![
                    Span::raw(if is_active { "* " } else { "  " }),
                    Span::styled(format!("{:<16}", adapter.name), name_style),
                    Span::raw(format!(
                        " {:<9} {:<5} {:<10} {:<11} {}",
                        adapter.link_type.to_string(),
                        adapter.status.to_string(),
                        link_speed_label(adapter.link_speed_mbps),
                        if adapter.has_ipv4_gateway { "gateway" } else { "" },
                        addresses
                    )),
                ]))
            })
            .collect();

        let title = if items.is_empty() {
            "Adapters (none found, press 'r' to refresh)"
        } else {
            "Adapters"
        };

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(Color::White));

        frame.render_widget(list, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let footer = Paragraph::new("'u' cycle unit | 'r' refresh adapters | 'q' or ESC quit")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::TOP));

        frame.render_widget(footer, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::adapters::{ByteCounters, LinkType, StaticCatalog};
    use crate::collectors::throughput::SpeedUnit;
    use ratatui::backend::TestBackend;
    use std::net::Ipv4Addr;

    fn test_dashboard() -> (Dashboard, Arc<StaticCatalog>) {
        let catalog = Arc::new(StaticCatalog::new(vec![
            AdapterDescriptor::new("lo", LinkType::Loopback).with_ipv4(Ipv4Addr::LOCALHOST),
            AdapterDescriptor::new("eth0", LinkType::Wired)
                .with_gateway(true)
                .with_link_speed(1_000)
                .with_ipv4(Ipv4Addr::new(10, 0, 0, 7)),
        ]));
        let engine = Arc::new(ThroughputEngine::new(catalog.clone()));
        (Dashboard::new(engine, Duration::from_secs(1), UnitMode::Auto), catalog)
    }

    fn rendered_text(dashboard: &Dashboard) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).expect("Failed to create terminal");
        terminal.draw(|f| dashboard.ui(f)).expect("Failed to draw");

        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[tokio::test]
    async fn test_unit_key_cycles_modes() {
        let (mut dashboard, _) = test_dashboard();

        assert!(!dashboard.handle_key(KeyCode::Char('u')).await);
        assert_eq!(dashboard.unit, UnitMode::Fixed(SpeedUnit::BytesPerSec));

        for _ in 0..4 {
            dashboard.handle_key(KeyCode::Char('u')).await;
        }
        assert_eq!(dashboard.unit, UnitMode::Auto);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let (mut dashboard, _) = test_dashboard();
        assert!(dashboard.handle_key(KeyCode::Char('q')).await);
        assert!(dashboard.handle_key(KeyCode::Esc).await);
        assert!(!dashboard.handle_key(KeyCode::Char('x')).await);
    }

    #[tokio::test]
    async fn test_refresh_and_sample_populate_view() {
        let (mut dashboard, catalog) = test_dashboard();
        catalog.set_counters(&AdapterId::new("eth0"), ByteCounters::new(1_000, 1_000));

        dashboard.handle_key(KeyCode::Char('r')).await;
        assert_eq!(dashboard.adapters.len(), 2);

        dashboard.take_sample().await;
        assert_eq!(dashboard.samples_taken, 1);
        assert_eq!(dashboard.current_rate, ThroughputRate::ZERO);
        assert_eq!(dashboard.active_adapter, Some(AdapterId::new("eth0")));

        let text = rendered_text(&dashboard);
        assert!(text.contains("Primary adapter: eth0"), "primary adapter should be shown");
        assert!(text.contains("10.0.0.7"), "adapter addresses should be listed");
        assert!(text.contains("1000 Mbps"), "link speed should be listed");
        assert!(text.contains("↓1K ↑1K"), "tray label should be shown");
    }

    #[tokio::test]
    async fn test_failed_cycle_clears_primary_adapter() {
        let (mut dashboard, catalog) = test_dashboard();

        dashboard.take_sample().await;
        assert_eq!(dashboard.active_adapter, Some(AdapterId::new("eth0")));

        catalog.set_enumeration_failure(Some("facility offline"));
        dashboard.take_sample().await;
        assert_eq!(dashboard.samples_taken, 2);
        assert_eq!(dashboard.active_adapter, None);

        let text = rendered_text(&dashboard);
        assert!(text.contains("Primary adapter: none"), "stale adapter should not be shown");
    }

    #[tokio::test]
    async fn test_enumeration_failure_is_reported() {
        let (mut dashboard, catalog) = test_dashboard();
        catalog.set_enumeration_failure(Some("facility offline"));

        dashboard.refresh_adapters().await;
        assert!(dashboard.error_message.as_deref().unwrap_or("").contains("facility offline"));

        let text = rendered_text(&dashboard);
        assert!(text.contains("Adapter enumeration failed"));
    }
}
