// App state and main event loop.
// Manages tabs, the refresh timer, background fetch results, and keyboard input.

use std::io;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::aggregate;
use crate::cache::CacheEntry;
use crate::fetch;
use crate::github::PullState;
use crate::model::{LanguageStat, PullRequest, Repository};
use crate::refresh::{FetchMessage, Refresher};
use crate::state::{ConsoleState, SelectableList};
use crate::ui;

/// Active tab in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Repositories,
    Languages,
    PullRequests,
    Console,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Repositories => "Repositories",
            Tab::Languages => "Languages",
            Tab::PullRequests => "Pull Requests",
            Tab::Console => "Console",
        }
    }
}

/// Pull request awaiting close confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClose {
    pub repo: String,
    pub number: u64,
    pub title: String,
}

/// Main application state.
pub struct App {
    /// Currently active tab.
    pub active_tab: Tab,
    /// Whether the pull request tab is available.
    pub admin: bool,
    pub repositories: SelectableList<Repository>,
    /// Organization-wide shares, recomputed when the repository list changes.
    pub languages: Vec<LanguageStat>,
    pub pull_requests: SelectableList<PullRequest>,
    pub pending_close: Option<PendingClose>,
    pub console: ConsoleState,
    pub show_help: bool,
    /// Whether the app should exit.
    pub should_quit: bool,
    refresher: Refresher,
    messages: UnboundedReceiver<FetchMessage>,
    poll_interval: Duration,
    last_poll: Option<Instant>,
}

impl App {
    pub fn new(
        refresher: Refresher,
        messages: UnboundedReceiver<FetchMessage>,
        poll_interval: Duration,
        admin: bool,
    ) -> Self {
        Self {
            active_tab: Tab::default(),
            admin,
            repositories: SelectableList::new(),
            languages: Vec::new(),
            pull_requests: SelectableList::new(),
            pending_close: None,
            console: ConsoleState::new(),
            show_help: false,
            should_quit: false,
            refresher,
            messages,
            poll_interval,
            last_poll: None,
        }
    }

    pub fn org(&self) -> &str {
        self.refresher.org()
    }

    pub fn refresher(&self) -> &Refresher {
        &self.refresher
    }

    /// Tabs shown in the tab bar, in order.
    pub fn tabs(&self) -> Vec<Tab> {
        let mut tabs = vec![Tab::Repositories, Tab::Languages];
        if self.admin {
            tabs.push(Tab::PullRequests);
        }
        tabs.push(Tab::Console);
        tabs
    }

    fn cycle_tab(&mut self, forward: bool) {
        let tabs = self.tabs();
        let current = tabs
            .iter()
            .position(|t| *t == self.active_tab)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % tabs.len()
        } else {
            (current + tabs.len() - 1) % tabs.len()
        };
        self.active_tab = tabs[next];
        if self.active_tab == Tab::Console {
            self.console.mark_read();
        }
    }

    /// Show whatever the cache slots hold, then refresh the stale ones.
    pub fn load_cached(&mut self) {
        let org = self.org().to_string();
        if let Some(entry) = self.refresher.repos_cache().load::<Vec<Repository>>() {
            self.console.info(format!(
                "Loaded {} cached repositories for {}",
                entry.payload.len(),
                org
            ));
            self.apply_repositories(entry);
        }
        if self.admin {
            if let Some(entry) = self.refresher.pulls_cache().load::<Vec<PullRequest>>() {
                self.apply_pull_requests(entry);
            }
        }
        self.poll();
    }

    /// Refresh every slot that is no longer fresh and not already loading.
    pub fn poll(&mut self) {
        self.last_poll = Some(Instant::now());
        let now = Utc::now();

        if !self.repositories.state.is_loading()
            && !self.refresher.repos_cache().is_slot_fresh(now)
        {
            debug!("repository cache stale");
            self.refresh_repositories();
        }
        if self.admin
            && !self.pull_requests.state.is_loading()
            && !self.refresher.pulls_cache().is_slot_fresh(now)
        {
            debug!("pull request cache stale");
            self.refresh_pull_requests();
        }
    }

    fn poll_due(&self) -> bool {
        self.last_poll
            .is_none_or(|last| last.elapsed() >= self.poll_interval)
    }

    pub fn refresh_repositories(&mut self) {
        self.repositories.start_loading();
        self.refresher.refresh_repositories();
    }

    pub fn refresh_pull_requests(&mut self) {
        self.pull_requests.start_loading();
        self.refresher.refresh_pull_requests();
    }

    /// Manual refresh of the data set behind the active tab.
    fn refresh_current(&mut self) {
        match self.active_tab {
            Tab::Repositories | Tab::Languages => self.refresh_repositories(),
            Tab::PullRequests => self.refresh_pull_requests(),
            Tab::Console => {}
        }
    }

    fn apply_repositories(&mut self, entry: CacheEntry<Vec<Repository>>) {
        self.repositories.replace(entry.payload, entry.captured_at);
        self.languages = aggregate::aggregate(&self.repositories.items);
    }

    fn apply_pull_requests(&mut self, entry: CacheEntry<Vec<PullRequest>>) {
        self.pull_requests.replace(entry.payload, entry.captured_at);
    }

    /// Apply a background result to the displayed state.
    pub fn handle_message(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::Repositories(Ok(entry)) => {
                self.console.info(format!(
                    "Refreshed {} repositories",
                    entry.payload.len()
                ));
                self.apply_repositories(entry);
            }
            FetchMessage::Repositories(Err(e)) => {
                self.console.error(format!("Repository refresh failed: {}", e));
                self.repositories.fail(e.user_message());
            }
            FetchMessage::PullRequests(Ok(entry)) => {
                self.console.info(format!(
                    "Refreshed {} open pull requests",
                    entry.payload.len()
                ));
                self.apply_pull_requests(entry);
            }
            FetchMessage::PullRequests(Err(e)) => {
                self.console
                    .error(format!("Pull request refresh failed: {}", e));
                self.pull_requests.fail(e.user_message());
            }
            FetchMessage::PullClosed {
                repo,
                number,
                result: Ok(state),
            } => {
                if state == PullState::Closed {
                    self.console.info(format!("Closed {}#{}", repo, number));
                } else {
                    self.console
                        .warn(format!("{}#{} is now {:?}", repo, number, state));
                }
                self.remove_pull_request(&repo, number);
            }
            FetchMessage::PullClosed {
                repo,
                number,
                result: Err(e),
            } => {
                self.console
                    .error(format!("Closing {}#{} failed: {}", repo, number, e));
            }
        }
    }

    /// Remove a closed pull request from the list and its cache slot.
    fn remove_pull_request(&mut self, repo: &str, number: u64) {
        let remaining = fetch::remove_pull_request(&self.pull_requests.items, repo, number);
        if remaining.len() == self.pull_requests.len() {
            return;
        }
        // Keep the original capture time so the slot does not look fresher than it is.
        let captured_at = self.pull_requests.captured_at.unwrap_or_else(Utc::now);
        let entry = self.refresher.pulls_cache().store(remaining, captured_at);
        self.apply_pull_requests(entry);
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.messages.try_recv() {
            self.handle_message(message);
        }
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        info!(org = self.org(), admin = self.admin, "starting dashboard");
        self.load_cached();

        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
            self.drain_messages();
            if self.poll_due() {
                self.poll();
            }
        }
        Ok(())
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.pending_close.is_some() {
            self.handle_confirm_key(key.code);
            return;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.cycle_tab(true),
            KeyCode::BackTab => self.cycle_tab(false),
            KeyCode::Char('r') => self.refresh_current(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char('c') if self.active_tab == Tab::PullRequests => {
                self.pending_close = self.pull_requests.selected_item().map(|pr| PendingClose {
                    repo: pr.repo.clone(),
                    number: pr.number,
                    title: pr.title.clone(),
                });
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(pending) = self.pending_close.take() {
                    self.console
                        .info(format!("Closing {}#{}", pending.repo, pending.number));
                    self.refresher
                        .close_pull_request(&pending.repo, pending.number);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_close = None;
            }
            _ => {}
        }
    }

    fn select_prev(&mut self) {
        match self.active_tab {
            Tab::Repositories => self.repositories.select_prev(),
            Tab::PullRequests => self.pull_requests.select_prev(),
            Tab::Console => self.console.select_prev(),
            Tab::Languages => {}
        }
    }

    fn select_next(&mut self) {
        match self.active_tab {
            Tab::Repositories => self.repositories.select_next(),
            Tab::PullRequests => self.pull_requests.select_next(),
            Tab::Console => self.console.select_next(),
            Tab::Languages => {}
        }
    }
}
