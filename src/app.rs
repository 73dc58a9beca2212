// SPDX-License-Identifier: MIT
//
// The kiosk as an event-loop app.
//
// Keys drive the mode machine; the tick drives the poller. Both end up
// drawing on the same `TermDisplay`, whose presented screen is what
// `paint` hands to the diff renderer.
//
//   stdin → parser → on_event → Mode::handle_key → composer / post
//   tick  → Poller::tick → show_item / print_notification
//   paint ← TermDisplay::screen
//
// Opening the composer snapshots the timeline screen; leaving it puts the
// snapshot back, so nothing is refetched.

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::info;

use kiosk_feed::mode::{KeyInput, Mode, Transition};
use kiosk_feed::render::{self, DisplayLayout, PrinterLayout, PrinterSurface};
use kiosk_feed::scheduler::{Dispatch, Poller};
use kiosk_feed::{Error, FeedItem, FeedService, ImageSource, NotificationItem};
use kiosk_term::canvas::Canvas;
use kiosk_term::event_loop::{Action, App};
use kiosk_term::input::{Event, KeyCode, KeyEvent, Modifiers};
use kiosk_term::terminal::Size;

use crate::display::{self, TermDisplay};

// ─── Outputs ────────────────────────────────────────────────────────────────

/// The two output devices plus what the strategies need to draw on them.
pub struct Outputs<P, I> {
    pub display: TermDisplay,
    pub printer: P,
    pub images: I,
    pub display_layout: DisplayLayout,
    pub printer_layout: PrinterLayout,
}

impl<P: PrinterSurface, I: ImageSource> Dispatch for Outputs<P, I> {
    fn show_item(&mut self, item: &FeedItem) -> Result<(), Error> {
        render::show_item(&mut self.display, &self.images, &self.display_layout, item)
    }

    fn print_notification(&mut self, note: &NotificationItem) -> Result<(), Error> {
        render::print_notification(&mut self.printer, &self.images, &self.printer_layout, note)
    }
}

// ─── Kiosk ──────────────────────────────────────────────────────────────────

pub struct Kiosk<S, P, I> {
    service: S,
    outputs: Outputs<P, I>,
    poller: Poller,
    mode: Mode,
    /// The timeline screen as it was when the composer opened.
    timeline_screen: Option<Canvas>,
}

impl<S, P, I> Kiosk<S, P, I>
where
    S: FeedService,
    P: PrinterSurface,
    I: ImageSource,
{
    pub fn new(service: S, outputs: Outputs<P, I>, interval: Duration) -> Self {
        Self::starting_at(service, outputs, interval, Instant::now())
    }

    fn starting_at(service: S, outputs: Outputs<P, I>, interval: Duration, now: Instant) -> Self {
        Self {
            service,
            outputs,
            poller: Poller::new(interval, now),
            mode: Mode::Viewing,
            timeline_screen: None,
        }
    }

    /// One poll step at `now`. Returns whether the screen changed.
    fn poll(&mut self, now: Instant) -> Result<bool> {
        self.poller
            .tick(now, &self.mode, &self.service, &mut self.outputs)?;
        Ok(self.outputs.display.take_dirty())
    }

    fn key(&mut self, key: KeyInput) -> Result<Action> {
        match self.mode.handle_key(key) {
            Transition::Ignored => {}
            Transition::Opened => {
                self.timeline_screen = Some(self.outputs.display.screen().clone());
                self.draw_composer()?;
            }
            Transition::Edited => self.draw_composer()?,
            Transition::Cancelled => {
                info!("compose cancelled");
                self.back_to_timeline();
            }
            Transition::Submitted(text) => {
                self.service
                    .submit_post(&text)
                    .context("posting toot")?;
                info!(chars = text.chars().count(), "toot posted");
                self.back_to_timeline();
            }
            Transition::Quit => {
                info!("quit requested");
                return Ok(Action::Quit);
            }
        }
        Ok(Action::Continue)
    }

    fn draw_composer(&mut self) -> Result<()> {
        let draft = self.mode.draft().unwrap_or_default();
        render::show_composer(&mut self.outputs.display, &self.outputs.display_layout, draft)?;
        Ok(())
    }

    fn back_to_timeline(&mut self) {
        if let Some(screen) = self.timeline_screen.take() {
            self.outputs.display.restore(&screen);
        }
    }
}

/// Map a terminal key to what the mode machine understands.
fn key_input(key: &KeyEvent) -> Option<KeyInput> {
    if key.is_interrupt() {
        return Some(KeyInput::Interrupt);
    }
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => {
            Some(KeyInput::Char(c))
        }
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Escape => Some(KeyInput::Escape),
        _ => None,
    }
}

impl<S, P, I> App for Kiosk<S, P, I>
where
    S: FeedService,
    P: PrinterSurface,
    I: ImageSource,
{
    type Error = anyhow::Error;

    fn on_event(&mut self, event: &Event) -> Result<Action> {
        match event {
            Event::Key(key) => match key_input(key) {
                Some(input) => self.key(input),
                None => Ok(Action::Continue),
            },
            // Pasted text only means something in the composer.
            Event::Paste(text) if self.mode.is_composing() => {
                for c in text.chars() {
                    self.mode.handle_key(KeyInput::Char(c));
                }
                self.draw_composer()?;
                Ok(Action::Continue)
            }
            Event::Paste(_) => Ok(Action::Continue),
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.outputs.display.resize(size.cols, size.rows);
        if let Some(screen) = &mut self.timeline_screen {
            *screen = display::refit(screen, size.cols, size.rows);
        }
    }

    fn on_tick(&mut self) -> Result<bool> {
        self.poll(Instant::now())
    }

    fn paint(&mut self, canvas: &mut Canvas) {
        canvas.copy_from(self.outputs.display.screen());
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_feed::bitmap::fit_within;
    use kiosk_feed::{Account, Bitmap, BoxError, ItemId, NotificationKind, ServiceError};
    use kiosk_print::EscPos;
    use kiosk_term::color::CellColor;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    const STEP: Duration = Duration::from_secs(11);

    // ── fakes ──

    #[derive(Default)]
    struct Server {
        timeline: RefCell<Option<FeedItem>>,
        notifications: RefCell<Option<NotificationItem>>,
        posts: RefCell<Vec<String>>,
        down: bool,
    }

    impl FeedService for Server {
        fn timeline_head(&self) -> Result<Option<FeedItem>, ServiceError> {
            Ok(self.timeline.borrow().clone())
        }

        fn notifications_head(&self) -> Result<Option<NotificationItem>, ServiceError> {
            Ok(self.notifications.borrow().clone())
        }

        fn submit_post(&self, text: &str) -> Result<(), ServiceError> {
            if self.down {
                return Err(ServiceError::Status {
                    endpoint: "statuses".into(),
                    status: 500,
                    body: String::new(),
                });
            }
            self.posts.borrow_mut().push(text.to_owned());
            Ok(())
        }
    }

    struct Squares;

    impl ImageSource for Squares {
        fn thumbnail(&self, _url: &str, max_w: u32, max_h: u32) -> Result<Bitmap, BoxError> {
            let (w, h) = fit_within(64, 64, max_w, max_h);
            Ok(Bitmap::filled(w, h, [200, 0, 0, 255]))
        }
    }

    type TestKiosk<'a> = Kiosk<&'a Server, EscPos<Vec<u8>>, Squares>;

    fn account(handle: &str) -> Account {
        Account {
            handle: handle.into(),
            display_name: String::new(),
            avatar_url: format!("https://example.social/{handle}.png"),
        }
    }

    fn post(id: &str, body: &str) -> FeedItem {
        FeedItem {
            id: ItemId::new(id),
            author: account("alice"),
            created_at: "2024-05-01T12:00:00Z".into(),
            body_markup: format!("<p>{body}</p>"),
            reblog: None,
        }
    }

    fn kiosk(server: &Server) -> (TestKiosk<'_>, Instant) {
        let now = Instant::now();
        let outputs = Outputs {
            display: TermDisplay::new(40, 12, CellColor::Rgb(32, 32, 32), CellColor::WHITE),
            printer: EscPos::new(Vec::new()).unwrap(),
            images: Squares,
            display_layout: DisplayLayout {
                origin_x: 1,
                origin_y: 0,
                text_width: 36,
                large_avatar: 8,
                small_avatar: 4,
                pixel_rows_per_unit: 2,
            },
            printer_layout: PrinterLayout::NARROW,
        };
        (Kiosk::starting_at(server, outputs, Duration::from_secs(10), now), now)
    }

    fn press(k: &mut TestKiosk<'_>, code: KeyCode) -> Action {
        k.on_event(&Event::Key(KeyEvent::new(code, Modifiers::empty())))
            .unwrap()
    }

    fn type_text(k: &mut TestKiosk<'_>, text: &str) {
        for c in text.chars() {
            press(k, KeyCode::Char(c));
        }
    }

    fn screen_text(k: &TestKiosk<'_>) -> String {
        let screen = k.outputs.display.screen();
        (0..screen.height())
            .map(|y| {
                screen
                    .row(y)
                    .unwrap()
                    .iter()
                    .filter_map(|c| c.character())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ── keys ──

    #[test]
    fn terminal_keys_map_onto_mode_keys() {
        let plain = |code| KeyEvent::new(code, Modifiers::empty());
        assert_eq!(key_input(&plain(KeyCode::Char('a'))), Some(KeyInput::Char('a')));
        assert_eq!(key_input(&plain(KeyCode::Enter)), Some(KeyInput::Enter));
        assert_eq!(key_input(&plain(KeyCode::Escape)), Some(KeyInput::Escape));
        assert_eq!(key_input(&plain(KeyCode::Backspace)), Some(KeyInput::Backspace));
        assert_eq!(key_input(&plain(KeyCode::Up)), None);
        assert_eq!(
            key_input(&KeyEvent::new(KeyCode::Char('c'), Modifiers::CTRL)),
            Some(KeyInput::Interrupt)
        );
        assert_eq!(key_input(&KeyEvent::new(KeyCode::Char('x'), Modifiers::ALT)), None);
        assert_eq!(
            key_input(&KeyEvent::new(KeyCode::Char('A'), Modifiers::SHIFT)),
            Some(KeyInput::Char('A'))
        );
    }

    #[test]
    fn escape_while_viewing_quits() {
        let server = Server::default();
        let (mut k, _) = kiosk(&server);
        assert_eq!(press(&mut k, KeyCode::Escape), Action::Quit);
    }

    // ── polling ──

    #[test]
    fn new_timeline_head_is_drawn() {
        let server = Server::default();
        *server.timeline.borrow_mut() = Some(post("1", "hello kiosk"));
        let (mut k, t0) = kiosk(&server);

        k.outputs.display.take_dirty();
        assert!(!k.poll(t0 + Duration::from_secs(5)).unwrap());
        assert!(k.poll(t0 + STEP).unwrap());
        assert!(screen_text(&k).contains("hello kiosk"));
        assert!(screen_text(&k).contains("alice"));
        assert!(!k.poll(t0 + STEP * 2).unwrap());
    }

    #[test]
    fn notifications_reach_the_printer() {
        let server = Server::default();
        *server.notifications.borrow_mut() = Some(NotificationItem {
            id: ItemId::new("n1"),
            kind: NotificationKind::Follow,
            actor: account("bob"),
            created_at: "2024-05-01T12:00:00Z".into(),
            status: None,
        });
        let (mut k, t0) = kiosk(&server);
        k.poll(t0 + STEP).unwrap();

        let paper = String::from_utf8_lossy(k.outputs.printer.get_ref()).into_owned();
        assert!(paper.contains("Followed you"));
        assert!(paper.contains("bob"));
    }

    // ── composing ──

    #[test]
    fn composing_suspends_the_timeline_and_restores_it() {
        let server = Server::default();
        *server.timeline.borrow_mut() = Some(post("1", "first"));
        let (mut k, t0) = kiosk(&server);
        k.poll(t0 + STEP).unwrap();
        let timeline = k.outputs.display.screen().clone();

        press(&mut k, KeyCode::Enter);
        type_text(&mut k, "hi");
        assert!(screen_text(&k).contains("ENTER TOOT:"));
        assert!(screen_text(&k).contains("hi"));

        *server.timeline.borrow_mut() = Some(post("2", "second"));
        k.poll(t0 + STEP * 2).unwrap();
        assert!(!screen_text(&k).contains("second"));

        press(&mut k, KeyCode::Escape);
        assert_eq!(k.outputs.display.screen(), &timeline);
        assert!(server.posts.borrow().is_empty());
    }

    #[test]
    fn enter_posts_the_draft() {
        let server = Server::default();
        let (mut k, _) = kiosk(&server);
        press(&mut k, KeyCode::Enter);
        type_text(&mut k, "hello world!");
        press(&mut k, KeyCode::Backspace);
        assert_eq!(press(&mut k, KeyCode::Enter), Action::Continue);

        assert_eq!(*server.posts.borrow(), vec!["hello world".to_owned()]);
        assert!(!k.mode.is_composing());
        assert!(!screen_text(&k).contains("ENTER TOOT:"));
    }

    #[test]
    fn paste_lands_in_the_draft() {
        let server = Server::default();
        let (mut k, _) = kiosk(&server);
        k.on_event(&Event::Paste("ignored".into())).unwrap();
        press(&mut k, KeyCode::Enter);
        k.on_event(&Event::Paste("pasted".into())).unwrap();
        assert_eq!(k.mode.draft(), Some("pasted"));
        assert!(screen_text(&k).contains("pasted"));
    }

    #[test]
    fn failed_post_is_an_error() {
        let server = Server {
            down: true,
            ..Server::default()
        };
        let (mut k, _) = kiosk(&server);
        press(&mut k, KeyCode::Enter);
        type_text(&mut k, "x");
        let err = k
            .on_event(&Event::Key(KeyEvent::new(KeyCode::Enter, Modifiers::empty())))
            .unwrap_err();
        assert!(format!("{err:#}").contains("posting toot"));
    }

    // ── resize ──

    #[test]
    fn resize_keeps_the_screen_and_the_snapshot() {
        let server = Server::default();
        *server.timeline.borrow_mut() = Some(post("1", "short"));
        let (mut k, t0) = kiosk(&server);
        k.poll(t0 + STEP).unwrap();
        press(&mut k, KeyCode::Enter);

        k.on_resize(Size { cols: 30, rows: 8 });
        assert_eq!(k.outputs.display.screen().width(), 30);
        press(&mut k, KeyCode::Escape);
        assert_eq!(k.outputs.display.screen().height(), 8);
        assert!(screen_text(&k).contains("short"));
    }

    #[test]
    fn paint_copies_the_presented_screen() {
        let server = Server::default();
        let (mut k, _) = kiosk(&server);
        press(&mut k, KeyCode::Enter);
        let mut canvas = Canvas::new(40, 12);
        k.paint(&mut canvas);
        assert_eq!(&canvas, k.outputs.display.screen());
    }
}
