use std::{error::Error, fs, path::Path};

use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use env::{ContinuousCorridor, Corridor};
use once_cell::sync::Lazy;
use qlearn::{
    algo::{QAgent, QAgentConfig},
    decay,
    regressor::MlpRegressorConfig,
    trainer::{windowed_mean, History, Trainer, TrainerConfig},
};

mod env;

type Backend = Autodiff<NdArray>;

static DEVICE: Lazy<NdArrayDevice> = Lazy::new(NdArrayDevice::default);

const CORRIDOR_LEN: usize = 12;
const WINDOW: usize = 10;

fn write_history(path: &Path, history: &History) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["phase", "episode", "steps", "reward"])?;
    for (phase, episodes) in [("train", &history.train), ("val", &history.val)] {
        for (i, e) in episodes.iter().enumerate() {
            wtr.write_record([
                phase.to_string(),
                i.to_string(),
                e.steps.to_string(),
                e.reward.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let out = Path::new("target/corridor");
    fs::create_dir_all(out)?;

    // Tabular agent on the discrete corridor
    let mut env = Corridor::new(CORRIDOR_LEN, 0);
    let mut agent = QAgent::tabular(
        &env,
        QAgentConfig {
            epsilon: 0.1,
            alpha: 0.8,
            gamma: 0.9,
            seed: Some(0),
        },
    )?;
    let history = Trainer::new(TrainerConfig::default()).run(&mut agent, &mut env)?;
    println!(
        "tabular: average steps per {} training episodes {:?}",
        WINDOW * 10,
        windowed_mean(&history.train_steps(), WINDOW * 10)
    );
    println!(
        "tabular: validation reward {:?}",
        history.mean_val_reward()
    );
    write_history(&out.join("tabular.csv"), &history)?;

    // One regressor per action on the continuous corridor
    let mut env = ContinuousCorridor(Corridor::new(CORRIDOR_LEN, 0));
    let mut agent = QAgent::approximate(
        &env,
        QAgentConfig {
            epsilon: 0.05,
            alpha: 0.003,
            gamma: 0.9,
            seed: Some(0),
        },
        |_, alpha| {
            MlpRegressorConfig::new(1)
                .with_hidden_size(32)
                .with_learning_rate(alpha.into())
                .init::<Backend>(&*DEVICE)
        },
    )?;
    let trainer = Trainer::new(TrainerConfig {
        train_episodes: 200,
        val_episodes: 20,
        max_episode_steps: Some(100),
    })
    .with_schedule(decay::Exponential::new(2e-2, 1.0, 0.05)?);
    let history = trainer.run(&mut agent, &mut env)?;
    println!(
        "approximate: average steps per {WINDOW} training episodes {:?}",
        windowed_mean(&history.train_steps(), WINDOW)
    );
    println!(
        "approximate: validation reward {:?}",
        history.mean_val_reward()
    );
    write_history(&out.join("approximate.csv"), &history)?;

    Ok(())
}
