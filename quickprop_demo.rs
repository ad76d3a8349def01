use quickprop::{fit, load_config, Activation, Loss, QuickpropConfig, TrainingOutcome};
use tracing_subscriber::EnvFilter;

// Logical OR learned by a single sigmoid neuron. The third feature is a
// constant 1.0 acting as the bias.
const NUM_FEATURES: usize = 3;
const NUM_SAMPLES: usize = 4;
const INPUTS: [[f64; NUM_FEATURES]; NUM_SAMPLES] = [
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
];
const TARGETS: [f64; NUM_SAMPLES] = [0.0, 1.0, 1.0, 1.0];

// Config file from the first CLI argument, otherwise defaults with progress
// reporting switched on.
fn config_from_args(args: &[String]) -> quickprop::Result<QuickpropConfig> {
    match args.get(1) {
        Some(path) => load_config(path),
        None => Ok(QuickpropConfig::default().with_debug(true)),
    }
}

fn train(config: &QuickpropConfig) -> quickprop::Result<TrainingOutcome> {
    let inputs: Vec<Vec<f64>> = INPUTS.iter().map(|row| row.to_vec()).collect();
    fit(
        &inputs,
        &TARGETS,
        &[0.0; NUM_FEATURES],
        Activation::Sigmoid,
        Loss::MeanSquaredError,
        config,
    )
}

fn report(outcome: &TrainingOutcome) {
    println!(
        "Stopped after {} iterations ({:?}), final loss {:.6}",
        outcome.iterations, outcome.status, outcome.final_loss
    );
    println!("Weights: {:?}", outcome.parameters);
    for (sample, prediction) in outcome.prediction.iter().enumerate() {
        println!(
            "Input: {:.1}, {:.1}, Expected Output: {:.1}, Predicted Output: {:.3}",
            INPUTS[sample][0], INPUTS[sample][1], TARGETS[sample], prediction
        );
    }
}

fn main() -> quickprop::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = config_from_args(&args)?;
    let outcome = train(&config)?;
    report(&outcome);
    Ok(())
}
