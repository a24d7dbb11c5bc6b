use std::time::Instant;

use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info};

use crate::corpus::Corpus;
use crate::session::{Phase, Session, SessionEvent};

/// What the event loop should do after handling a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub corpus: Corpus,
    pub session: Session,
}

impl App {
    pub fn new(corpus: Corpus) -> Result<Self> {
        let Some(sentence) = corpus.pick() else {
            bail!("corpus {:?} has no sentences", corpus.name);
        };
        let session = Session::new(sentence);

        Ok(Self { corpus, session })
    }

    fn apply(&mut self, event: SessionEvent, now: Instant) {
        let before = self.session.phase;
        let session = std::mem::replace(&mut self.session, Session::new(String::new()));
        self.session = session.reduce(event, now);

        if before != self.session.phase && self.session.phase == Phase::Finished {
            info!(
                "finished in {:.2}s at {:.2} wpm",
                self.session.elapsed_secs,
                self.session.speed()
            );
        }
    }

    /// Replace the input with `value`, as an edit to the input line would
    pub fn set_input(&mut self, value: String, now: Instant) {
        if self.session.has_finished() || value == self.session.input {
            return;
        }
        self.apply(SessionEvent::Keystroke(value), now);
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self.session.is_ticking() {
            self.apply(SessionEvent::Tick, now);
        }
    }

    /// Start over with a freshly picked sentence
    pub fn reset(&mut self, now: Instant) {
        let sentence = self
            .corpus
            .pick()
            .unwrap_or(self.session.sentence.as_str())
            .to_string();
        debug!("new sentence: {sentence:?}");
        self.apply(SessionEvent::Reset(sentence), now);
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if ctrl => return Control::Quit,
            KeyCode::Tab => self.reset(now),
            KeyCode::Char('r') if ctrl => self.reset(now),
            KeyCode::Char('u') if ctrl => self.set_input(String::new(), now),
            KeyCode::Char('w') if ctrl => {
                let value = delete_last_word(&self.session.input);
                self.set_input(value, now);
            }
            KeyCode::Backspace => {
                let mut value = self.session.input.clone();
                value.pop();
                self.set_input(value, now);
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                let mut value = self.session.input.clone();
                value.push(c);
                self.set_input(value, now);
            }
            _ => {}
        }

        Control::Continue
    }
}

fn delete_last_word(input: &str) -> String {
    let trimmed = input.trim_end();
    let keep = trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(0);

    trimmed[..keep].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)), now);
        }
    }

    #[test]
    fn test_new_picks_from_corpus() {
        let app = App::new(Corpus::builtin()).unwrap();
        assert!(app.corpus.sentences.contains(&app.session.sentence));
        assert_eq!(app.session.phase, Phase::NotStarted);
    }

    #[test]
    fn test_new_rejects_empty_corpus() {
        let corpus = Corpus {
            name: "empty".to_string(),
            sentences: vec![],
        };
        assert!(App::new(corpus).is_err());
    }

    #[test]
    fn test_new_rejects_blank_custom_sentence() {
        assert!(App::new(Corpus::single("")).is_err());
        assert!(App::new(Corpus::single("   ")).is_err());
    }

    #[test]
    fn test_typing_full_sentence_finishes() {
        let mut app = App::new(Corpus::single("hi you")).unwrap();
        let t0 = Instant::now();

        type_str(&mut app, "hi yo", t0);
        assert_eq!(app.session.phase, Phase::Typing);

        app.handle_key(key(KeyCode::Char('u')), t0 + Duration::from_secs(30));
        assert_eq!(app.session.phase, Phase::Finished);
        assert_eq!(app.session.speed(), 4.0);
    }

    #[test]
    fn test_backspace_corrects_mistake() {
        let mut app = App::new(Corpus::single("ab")).unwrap();
        let t0 = Instant::now();

        type_str(&mut app, "ax", t0);
        assert_eq!(app.session.highlight().incorrect, "x");

        app.handle_key(key(KeyCode::Backspace), t0);
        assert_eq!(app.session.input, "a");

        type_str(&mut app, "b", t0);
        assert!(app.session.has_finished());
    }

    #[test]
    fn test_backspace_on_empty_input_does_not_start() {
        let mut app = App::new(Corpus::single("ab")).unwrap();

        app.handle_key(key(KeyCode::Backspace), Instant::now());

        assert_eq!(app.session.phase, Phase::NotStarted);
        assert!(app.session.started_at.is_none());
    }

    #[test]
    fn test_ctrl_w_deletes_last_word() {
        let mut app = App::new(Corpus::single("one two three")).unwrap();
        let t0 = Instant::now();

        type_str(&mut app, "one twx", t0);
        app.handle_key(ctrl('w'), t0);

        assert_eq!(app.session.input, "one ");
    }

    #[test]
    fn test_ctrl_u_clears_input() {
        let mut app = App::new(Corpus::single("one two")).unwrap();
        let t0 = Instant::now();

        type_str(&mut app, "one", t0);
        app.handle_key(ctrl('u'), t0);

        assert_eq!(app.session.input, "");
        assert_eq!(app.session.phase, Phase::Typing);
    }

    #[test]
    fn test_keys_ignored_after_finish() {
        let mut app = App::new(Corpus::single("ok")).unwrap();
        let t0 = Instant::now();

        type_str(&mut app, "ok", t0);
        app.handle_key(key(KeyCode::Backspace), t0);
        type_str(&mut app, "zz", t0);

        assert_eq!(app.session.input, "ok");
        assert!(app.session.has_finished());
    }

    #[test]
    fn test_tab_resets() {
        let mut app = App::new(Corpus::single("ok")).unwrap();
        let t0 = Instant::now();

        type_str(&mut app, "ok", t0);
        assert_eq!(app.handle_key(key(KeyCode::Tab), t0), Control::Continue);

        assert_eq!(app.session, Session::new("ok"));
    }

    #[test]
    fn test_ctrl_r_resets_mid_typing() {
        let mut app = App::new(Corpus::single("okay")).unwrap();
        let t0 = Instant::now();

        type_str(&mut app, "ok", t0);
        app.handle_key(ctrl('r'), t0);

        assert_eq!(app.session.phase, Phase::NotStarted);
        assert_eq!(app.session.input, "");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new(Corpus::single("ok")).unwrap();
        let now = Instant::now();

        assert_eq!(app.handle_key(key(KeyCode::Esc), now), Control::Quit);
        assert_eq!(app.handle_key(ctrl('c'), now), Control::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Char('c')), now), Control::Continue);
    }

    #[test]
    fn test_tick_only_while_typing() {
        let mut app = App::new(Corpus::single("hello")).unwrap();
        let t0 = Instant::now();

        app.on_tick(t0 + Duration::from_secs(1));
        assert_eq!(app.session.elapsed_secs, 0.0);

        type_str(&mut app, "h", t0);
        app.on_tick(t0 + Duration::from_secs(2));
        assert_eq!(app.session.elapsed_secs, 2.0);
    }

    #[test]
    fn test_delete_last_word() {
        assert_eq!(delete_last_word("one two"), "one ");
        assert_eq!(delete_last_word("one two  "), "one ");
        assert_eq!(delete_last_word("single"), "");
        assert_eq!(delete_last_word(""), "");
    }
}
