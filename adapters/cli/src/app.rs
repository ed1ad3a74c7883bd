//! Main menu and the screens reachable from it.

use std::{io, time::Duration};

use anyhow::{Context, Result};
use escape_maze_core::{AudioCue, GameConfig};
use escape_maze_persistence::UserStore;
use escape_maze_session::{AudioSink, IntervalClock, Key, Session, SessionError, SilentAudio};
use escape_maze_system_progression::{catalog, purchase, Profile, Roster, MAX_USERNAME_LENGTH};
use escape_maze_terminal::{BellAudio, TerminalCanvas};
use tracing::{info, warn};

use crate::{
    controller::Console,
    screens::{self, MenuOption},
};

/// Real time taken by one second of the round clock.
const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Flags that shape every session.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Options {
    pub(crate) seed: Option<u64>,
    pub(crate) debug: bool,
    pub(crate) mute: bool,
}

/// Whether `err` was caused by the player pressing Ctrl+C.
pub(crate) fn is_interrupt(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        let io_error = match cause.downcast_ref::<SessionError>() {
            Some(SessionError::Io(io_error)) => Some(io_error),
            Some(SessionError::Generation(_)) => None,
            None => cause.downcast_ref::<io::Error>(),
        };
        io_error.is_some_and(|io_error| io_error.kind() == io::ErrorKind::Interrupted)
    })
}

fn sound(mute: bool) -> Box<dyn AudioSink + Send> {
    if mute {
        Box::new(SilentAudio)
    } else {
        Box::new(BellAudio)
    }
}

pub(crate) struct App {
    config: GameConfig,
    store: UserStore,
    roster: Roster,
    username: String,
    is_new: bool,
    options: Options,
    console: Console,
    menu_audio: Box<dyn AudioSink + Send>,
}

impl App {
    pub(crate) fn new(config: GameConfig, store: UserStore, roster: Roster, options: Options) -> Self {
        Self {
            config,
            store,
            roster,
            username: String::new(),
            is_new: false,
            options,
            console: Console::default(),
            menu_audio: sound(options.mute),
        }
    }

    /// Logs in, then serves the main menu until the player exits.
    pub(crate) fn run(&mut self, username: Option<String>) -> Result<()> {
        if !self.login(username)? {
            return Ok(());
        }
        loop {
            self.console
                .show(&screens::main_menu(&self.username, self.is_new))?;
            let selected = match self.console.key()?.key {
                Key::Char(c) => MenuOption::from_digit(c),
                Key::Escape => Some(MenuOption::Exit),
                _ => None,
            };
            let Some(option) = selected else {
                continue;
            };
            self.menu_audio.play(AudioCue::MenuNavigation);
            match option {
                MenuOption::Play => self.play()?,
                MenuOption::Leaderboard => {
                    self.console
                        .show(&screens::leaderboard(&self.roster, &self.username))?;
                    let _ = self.console.key()?;
                }
                MenuOption::UpgradeShop => self.shop()?,
                MenuOption::ChangeAccount => {
                    let _ = self.login(None)?;
                }
                MenuOption::About => {
                    self.console.show(&screens::about())?;
                    let _ = self.console.key()?;
                }
                MenuOption::Exit => return Ok(()),
            }
        }
    }

    fn profile(&self) -> Result<&Profile> {
        self.roster
            .get(&self.username)
            .with_context(|| format!("user {} is not in the roster", self.username))
    }

    /// Returns false when the player cancels.
    fn login(&mut self, preset: Option<String>) -> Result<bool> {
        let mut error: Option<String> = None;
        let mut preset = preset;
        loop {
            let raw = match preset.take() {
                Some(raw) => raw,
                None => {
                    let prompt = |typed: &str| screens::login(error.as_deref(), typed);
                    match self.console.read_line(prompt, MAX_USERNAME_LENGTH)? {
                        Some(raw) => raw,
                        None => return Ok(false),
                    }
                }
            };
            match self.roster.select_or_create(&raw, &self.config.upgrades) {
                Ok(login) => {
                    info!(user = %login.username, is_new = login.is_new, "logged in");
                    self.username = login.username;
                    self.is_new = login.is_new;
                    return Ok(true);
                }
                Err(err) => {
                    let mut message = err.to_string();
                    if let Some(first) = message.get_mut(..1) {
                        first.make_ascii_uppercase();
                    }
                    error = Some(message);
                }
            }
        }
    }

    fn play(&mut self) -> Result<()> {
        self.console
            .show(&screens::guide(&self.config, self.profile()?))?;
        if self.console.key()?.key == Key::Escape {
            return Ok(());
        }

        let seed = self.options.seed.unwrap_or_else(rand::random);
        self.console.clear()?;
        let mut session = Session::new(
            self.config.clone(),
            seed,
            self.options.debug,
            Box::new(TerminalCanvas::stdout()),
            sound(self.options.mute),
        )?;
        let mut clock = IntervalClock::spawn(session.stage(), CLOCK_INTERVAL)
            .context("failed to start the round clock")?;
        let profile = self
            .roster
            .get_mut(&self.username)
            .with_context(|| format!("user {} is not in the roster", self.username))?;
        let report = session.run(profile, &mut self.console, &mut clock);
        drop(clock);
        let report = report?;
        self.is_new = false;
        self.save();

        self.console.show(&screens::session_summary(&report))?;
        self.console.wait_for_enter()?;
        Ok(())
    }

    fn shop(&mut self) -> Result<()> {
        let mut notice = None;
        loop {
            let offers = catalog(self.profile()?);
            let page = screens::shop(self.profile()?, &offers, notice.take());
            self.console.show(&page)?;

            let offer = match self.console.key()?.key {
                Key::Escape => return Ok(()),
                Key::Char(c) => c
                    .to_digit(10)
                    .and_then(|digit| usize::try_from(digit).ok()?.checked_sub(1))
                    .and_then(|index| offers.get(index)),
                _ => None,
            };
            let Some(offer) = offer else {
                notice = Some(screens::invalid_option());
                continue;
            };

            self.console
                .show(&page.with_line(screens::confirm_purchase(offer)))?;
            if !matches!(self.console.key()?.key, Key::Char('y' | 'Y') | Key::Enter) {
                continue;
            }

            let profile = self
                .roster
                .get_mut(&self.username)
                .with_context(|| format!("user {} is not in the roster", self.username))?;
            match purchase(profile, offer.upgrade) {
                Ok(receipt) => {
                    info!(
                        user = %self.username,
                        upgrade = ?receipt.upgrade,
                        price = receipt.price,
                        balance = receipt.balance,
                        "upgrade purchased"
                    );
                    self.menu_audio.play(AudioCue::UpgradePurchase);
                    notice = Some(screens::purchased(offer));
                    self.save();
                }
                Err(err) => notice = Some(screens::purchase_failed(&err)),
            }
        }
    }

    fn save(&self) {
        self.store.commit(&self.roster);
        if let Err(err) = self.store.flush() {
            warn!(%err, "failed to save users");
        }
    }
}
