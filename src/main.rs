/// Entry point and main loop.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use config::CardConfig;
use domain::random::session_rng;
use domain::script;
use error::Result;
use sim::card::{Card, Phase};
use sim::event::CardEvent;
use ui::dispatch::{self, Hover};
use ui::gamepad::GamepadState;
use ui::input::{self, InputState, Intent};
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let (config, config_err) = match CardConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            eprintln!("Warning: {e}");
            eprintln!("Using default settings.");
            (CardConfig::default(), Some(e))
        }
    };

    if let Err(e) = logging::init(&config.log) {
        eprintln!("Warning: {e}");
    }
    if let Some(e) = config_err {
        warn!(error = %e, "config rejected, running with defaults");
    }
    info!(recipient = %config.recipient, seed = ?config.seed, "card starting");

    let mut rng = session_rng(config.seed);
    let mut card = Card::new(&script::DEFAULT, config.timing.clone(), config.display.max_confetti, &mut rng);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        error!(error = %e, "terminal init failed");
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = card_loop(&mut card, &mut renderer, sound.as_ref(), &config, &mut rng);
    card.teardown();

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "card loop failed");
        eprintln!("Card error: {e}");
    }

    println!();
    match card.phase() {
        Phase::Celebrating => println!("💖 {} said yes. Happy Valentine's Day!", config.recipient),
        Phase::Asking => println!("The question is still open, {}. 💌", config.recipient),
    }
}

fn card_loop(
    card: &mut Card,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &CardConfig,
    rng: &mut StdRng,
) -> Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    info!(connected = gp.connected, "gamepad probed");
    let mut hover = Hover::new();
    let mut last_tick = Instant::now();
    let tick_rate = config.timing.tick_rate;

    loop {
        kb.drain_events();
        gp.update();

        let grid = renderer.grid(&config.display)?;
        let view = grid.viewport();
        let mut events: Vec<CardEvent> = Vec::new();

        for &action in kb.actions.iter().chain(gp.actions()) {
            match input::resolve(action, card.phase(), card.modal_open()) {
                Some(Intent::Exit) => {
                    info!(phase = ?card.phase(), "leaving");
                    process_events(sound, &events);
                    return Ok(());
                }
                Some(intent) => events.extend(dispatch::apply(card, intent, view, rng)),
                None => {}
            }
        }

        for &(col, row) in &kb.clicks {
            events.extend(dispatch::click(card, grid, col, row, rng));
        }

        if kb.pointer_moved {
            if let Some((col, row)) = kb.pointer {
                events.extend(hover.moved(card, grid, col, row, rng));
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            last_tick = Instant::now();
            events.extend(card.tick(elapsed, view, rng));
            renderer.render(card, grid, &config.recipient)?;
        }

        process_events(sound, &events);
        std::thread::sleep(FRAME_SLEEP);
    }
}

fn process_events(sound: Option<&SoundEngine>, events: &[CardEvent]) {
    for event in events {
        debug!(?event, "card event");
        if let (Some(sfx), Some(engine)) = (sound::cue_for(event), sound) {
            engine.play(sfx);
        }
    }
}
