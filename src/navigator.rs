use crate::browser::{BrowserError, Surface};
use log::{debug, warn};
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

/// CSS marker the results site renders when a page load hits the
/// CAPTCHA gate.
pub const CAPTCHA_SELECTOR: &str = "#captchaImg";

/// Submit control of the CAPTCHA form.
pub const SUBMIT_SELECTOR: &str = "#send";

/// Human-input channel used to signal that a CAPTCHA has been solved
/// out-of-band (the operator types the answer into the visible browser
/// window, then confirms here).
pub trait CaptchaPrompt: Send + Sync {
    /// Block until the human confirms the challenge for `url` is solved.
    /// An error means the channel itself is gone, which ends the crawl.
    fn wait_for_solution(&self, url: &str) -> Result<(), BrowserError>;
}

/// Stdin-backed prompt. Concurrent challenges are surfaced one at a time
/// so two tasks never interleave their prompts.
pub struct StdinPrompt {
    gate: Mutex<()>,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self { gate: Mutex::new(()) }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptchaPrompt for StdinPrompt {
    fn wait_for_solution(&self, url: &str) -> Result<(), BrowserError> {
        let _gate = self.gate.lock().unwrap();

        let mut stdout = io::stdout();
        writeln!(stdout, "Captcha required for {}", url)
            .and_then(|()| write!(stdout, "Solve it in the browser window, then press Enter: "))
            .and_then(|()| stdout.flush())
            .map_err(|e| BrowserError::HumanInputClosed(e.to_string()))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| BrowserError::HumanInputClosed(e.to_string()))?;
        if read == 0 {
            return Err(BrowserError::HumanInputClosed("stdin closed".to_string()));
        }

        Ok(())
    }
}

/// Navigation state. `Loaded` without a CAPTCHA marker is the terminal
/// state; everything else loops back through `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavState {
    Loading,
    Loaded,
    CaptchaPending,
    AwaitingHumanInput,
    Submitting,
}

/// Drives one surface to a URL, absorbing transient failures and walking
/// the CAPTCHA recovery branch when challenged.
///
/// Transient navigation failures are retried indefinitely: the crawl is
/// long and unattended, and a page that refuses to load for hours is
/// preferable to a run that died at 3am. The only error this returns is
/// loss of the human-input channel.
pub struct Navigator {
    captcha_selector: String,
    submit_selector: String,
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            captcha_selector: CAPTCHA_SELECTOR.to_string(),
            submit_selector: SUBMIT_SELECTOR.to_string(),
        }
    }

    /// Navigate `surface` to `url`, returning once the page is loaded
    /// with no CAPTCHA marker present.
    pub fn goto<S: Surface>(
        &self,
        surface: &S,
        prompt: &dyn CaptchaPrompt,
        url: &str,
    ) -> Result<(), BrowserError> {
        let mut state = NavState::Loading;

        loop {
            state = match state {
                NavState::Loading => match surface.navigate(url) {
                    Ok(()) => NavState::Loaded,
                    Err(err) => {
                        warn!("failed to load {}, retrying: {}", url, err);
                        NavState::Loading
                    }
                },

                NavState::Loaded => match surface.has_element(&self.captcha_selector) {
                    Ok(false) => return Ok(()),
                    Ok(true) => NavState::CaptchaPending,
                    Err(err) => {
                        warn!("captcha check on {} failed, reloading: {}", url, err);
                        NavState::Loading
                    }
                },

                NavState::CaptchaPending => {
                    debug!("captcha required for {}", url);
                    NavState::AwaitingHumanInput
                }

                NavState::AwaitingHumanInput => {
                    prompt.wait_for_solution(url)?;
                    NavState::Submitting
                }

                NavState::Submitting => match surface.has_element(&self.submit_selector) {
                    Ok(true) => {
                        match surface
                            .click(&self.submit_selector)
                            .and_then(|()| surface.wait_for_navigation())
                        {
                            // A submission may re-trigger the challenge,
                            // so Loaded re-checks the marker.
                            Ok(()) => NavState::Loaded,
                            Err(err) => {
                                warn!("captcha submit on {} failed, reloading: {}", url, err);
                                NavState::Loading
                            }
                        }
                    }
                    Ok(false) => {
                        warn!("no submit control on the captcha page, reloading {}", url);
                        NavState::Loading
                    }
                    Err(err) => {
                        warn!("captcha submit lookup on {} failed, reloading: {}", url, err);
                        NavState::Loading
                    }
                },
            };
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// One scripted document: whether it shows the CAPTCHA gate, whether
    /// the gate has its submit control, and the page body.
    #[derive(Clone)]
    struct FakePage {
        captcha: bool,
        has_submit: bool,
        html: &'static str,
    }

    impl FakePage {
        fn clean(html: &'static str) -> Self {
            Self { captcha: false, has_submit: false, html }
        }

        fn captcha() -> Self {
            Self { captcha: true, has_submit: true, html: "<img id=\"captchaImg\">" }
        }

        fn captcha_without_submit() -> Self {
            Self { captcha: true, has_submit: false, html: "<img id=\"captchaImg\">" }
        }
    }

    /// Scripted surface: `navigate` consumes the next step (a load
    /// failure or a page), `wait_for_navigation` consumes the next page.
    struct FakeSurface {
        script: Mutex<VecDeque<Result<FakePage, ()>>>,
        current: Mutex<Option<FakePage>>,
        navigations: AtomicUsize,
    }

    impl FakeSurface {
        fn new(script: Vec<Result<FakePage, ()>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                current: Mutex::new(None),
                navigations: AtomicUsize::new(0),
            }
        }

        fn advance(&self) -> Result<(), BrowserError> {
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("fake surface script exhausted");
            match next {
                Ok(page) => {
                    *self.current.lock().unwrap() = Some(page);
                    Ok(())
                }
                Err(()) => Err(BrowserError::Navigation("scripted failure".to_string())),
            }
        }

        fn current(&self) -> FakePage {
            self.current.lock().unwrap().clone().expect("no page loaded")
        }
    }

    impl Surface for FakeSurface {
        fn navigate(&self, _url: &str) -> Result<(), BrowserError> {
            self.navigations.fetch_add(1, Ordering::SeqCst);
            self.advance()
        }

        fn wait_for_navigation(&self) -> Result<(), BrowserError> {
            self.advance()
        }

        fn has_element(&self, selector: &str) -> Result<bool, BrowserError> {
            let page = self.current();
            Ok(match selector {
                CAPTCHA_SELECTOR => page.captcha,
                SUBMIT_SELECTOR => page.has_submit,
                _ => false,
            })
        }

        fn click(&self, _selector: &str) -> Result<(), BrowserError> {
            Ok(())
        }

        fn content(&self) -> Result<String, BrowserError> {
            Ok(self.current().html.to_string())
        }
    }

    struct CountingPrompt {
        calls: AtomicUsize,
    }

    impl CountingPrompt {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    impl CaptchaPrompt for CountingPrompt {
        fn wait_for_solution(&self, _url: &str) -> Result<(), BrowserError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ClosedPrompt;

    impl CaptchaPrompt for ClosedPrompt {
        fn wait_for_solution(&self, _url: &str) -> Result<(), BrowserError> {
            Err(BrowserError::HumanInputClosed("stdin closed".to_string()))
        }
    }

    #[test]
    fn clean_load_returns_without_prompting() {
        let surface = FakeSurface::new(vec![Ok(FakePage::clean("<p>results</p>"))]);
        let prompt = CountingPrompt::new();

        Navigator::new().goto(&surface, &prompt, "http://x").unwrap();

        assert_eq!(surface.navigations.load(Ordering::SeqCst), 1);
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn transient_failures_are_retried_until_success() {
        let surface = FakeSurface::new(vec![
            Err(()),
            Err(()),
            Ok(FakePage::clean("<p>late</p>")),
        ]);
        let prompt = CountingPrompt::new();

        Navigator::new().goto(&surface, &prompt, "http://x").unwrap();

        assert_eq!(surface.navigations.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn captcha_is_submitted_and_post_submit_document_kept() {
        let surface = FakeSurface::new(vec![
            Ok(FakePage::captcha()),
            // Document produced by the submit transition.
            Ok(FakePage::clean("<p>after captcha</p>")),
        ]);
        let prompt = CountingPrompt::new();

        Navigator::new().goto(&surface, &prompt, "http://x").unwrap();

        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
        assert_eq!(surface.navigations.load(Ordering::SeqCst), 1);
        assert_eq!(surface.content().unwrap(), "<p>after captcha</p>");
    }

    #[test]
    fn resubmitted_captcha_prompts_again() {
        let surface = FakeSurface::new(vec![
            Ok(FakePage::captcha()),
            Ok(FakePage::captcha()),
            Ok(FakePage::clean("<p>finally</p>")),
        ]);
        let prompt = CountingPrompt::new();

        Navigator::new().goto(&surface, &prompt, "http://x").unwrap();

        assert_eq!(prompt.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_submit_control_restarts_navigation() {
        let surface = FakeSurface::new(vec![
            Ok(FakePage::captcha_without_submit()),
            // The restarted navigation finds the page unchallenged.
            Ok(FakePage::clean("<p>second try</p>")),
        ]);
        let prompt = CountingPrompt::new();

        Navigator::new().goto(&surface, &prompt, "http://x").unwrap();

        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
        assert_eq!(surface.navigations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_post_submit_transition_restarts_navigation() {
        let surface = FakeSurface::new(vec![
            Ok(FakePage::captcha()),
            // The wait after clicking submit fails...
            Err(()),
            // ...so the whole navigation restarts from scratch.
            Ok(FakePage::clean("<p>reloaded</p>")),
        ]);
        let prompt = CountingPrompt::new();

        Navigator::new().goto(&surface, &prompt, "http://x").unwrap();

        assert_eq!(surface.navigations.load(Ordering::SeqCst), 2);
        assert_eq!(surface.content().unwrap(), "<p>reloaded</p>");
    }

    #[test]
    fn lost_human_input_channel_is_surfaced() {
        let surface = FakeSurface::new(vec![Ok(FakePage::captcha())]);

        let err = Navigator::new()
            .goto(&surface, &ClosedPrompt, "http://x")
            .unwrap_err();

        assert!(matches!(err, BrowserError::HumanInputClosed(_)));
    }
}
