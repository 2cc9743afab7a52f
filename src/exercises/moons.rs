use rand::Rng;

use crate::{
    activation::ActivationFunction,
    config::MoonsConfig,
    data::{make_moons, one_hot, train_test_split},
    error::Result,
    exercises::Summary,
    models::Model,
    network::{Checkpoint, InputType, ModelMetadata, Network, NetworkSpec},
    report,
    train::{accuracy, metrics::predicted_class, train_loop, TrainConfig},
};

const N_CLASSES: usize = 2;

/// Feed-forward classifier on the two-moons dataset.
pub fn run<R: Rng + ?Sized>(config: &MoonsConfig, rng: &mut R) -> Result<Summary> {
    config.validate()?;
    let dataset = make_moons(config.n_samples, config.noise, rng);
    let (train, test) = train_test_split(dataset.samples(), config.test_fraction, rng)?;
    println!(
        "Two moons: {} samples (noise {}), {} train / {} test",
        dataset.len(), config.noise, train.len(), test.len()
    );

    let encode = |samples: &[([f64; 2], usize)]| -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        samples.iter()
            .map(|(p, label)| {
                let target = if config.loss.is_categorical() {
                    one_hot(*label, N_CLASSES)
                } else {
                    vec![*label as f64]
                };
                (p.to_vec(), target)
            })
            .unzip()
    };
    let (train_inputs, train_labels) = encode(&train[..]);
    let (test_inputs, test_labels) = encode(&test[..]);

    let mut spec = NetworkSpec::classifier(
        "moons",
        2,
        &config.hidden_layers,
        ActivationFunction::ReLU,
        N_CLASSES,
        config.loss,
    );
    spec.metadata = Some(ModelMetadata {
        description: Some("two-moons classifier".into()),
        input_type: Some(InputType::Numeric { features: 2 }),
        output_labels: Some(vec!["upper".into(), "lower".into()]),
    });
    let mut network = Network::from_spec(&spec, rng)?;
    println!(
        "Network: 2 -> {:?} -> {} ({} parameters), loss {:?}",
        config.hidden_layers, network.output_size(), network.parameter_count(), config.loss
    );

    let mut optimizer = config.optimizer.build();
    let train_config = TrainConfig::new(config.epochs, config.batch_size, config.loss)
        .with_log_every(config.log_every);
    let validation = (!test_inputs.is_empty())
        .then(|| (test_inputs.as_slice(), test_labels.as_slice()));
    let history = train_loop(
        &mut network,
        &train_inputs,
        &train_labels,
        validation,
        optimizer.as_mut(),
        &train_config,
        rng,
    )?;

    println!();
    report::print_epoch_table(&history, config.log_every);

    let test_accuracy = validation.map(|(vi, vl)| accuracy(&mut network, vi, vl));
    match test_accuracy {
        Some(acc) => println!("\nTest accuracy: {:.2}% on {} points", acc * 100.0, test_inputs.len()),
        None => println!("\nNo test split requested."),
    }

    if config.plot {
        report::plot_loss_curve(&history);
        let (points, inputs): (Vec<[f64; 2]>, &[Vec<f64>]) = if test.is_empty() {
            (train.iter().map(|s| s.0).collect(), train_inputs.as_slice())
        } else {
            (test.iter().map(|s| s.0).collect(), test_inputs.as_slice())
        };
        let classes: Vec<usize> = inputs.iter()
            .map(|x| predicted_class(&network.forward(x)))
            .collect();
        report::plot_moons(&points, &classes);
    }

    if let Some(path) = &config.save_model {
        let metadata = spec.metadata.clone().unwrap_or_default();
        Checkpoint::new(network, metadata).save_json(path)?;
        println!("Model saved to {}", path.display());
    }

    Ok(Summary { history, test_accuracy })
}
