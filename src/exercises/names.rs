use rand::Rng;

use crate::{
    config::NamesConfig,
    data::{line_to_sequence, one_hot, train_test_split, unicode_to_ascii, NameCorpus, ALL_LETTERS, N_LETTERS},
    error::{Error, Result},
    exercises::Summary,
    loss::LossType,
    models::{CharRnn, Model},
    network::{Checkpoint, InputType, ModelMetadata},
    report,
    train::{accuracy, confusion_matrix, top_k, train_loop, TrainConfig},
};

/// The `k` most likely categories for `name`, best first.
pub fn predict_name(
    model: &mut CharRnn,
    categories: &[String],
    name: &str,
    k: usize,
) -> Result<Vec<(String, f64)>> {
    let sequence = line_to_sequence(&unicode_to_ascii(name));
    if sequence.is_empty() {
        return Err(Error::data(format!("'{name}' has no letters the model can read")));
    }
    let probabilities = model.forward(&sequence);
    Ok(top_k(&probabilities, k)
        .into_iter()
        .map(|(i, p)| (categories.get(i).cloned().unwrap_or_else(|| i.to_string()), p))
        .collect())
}

/// Character-level RNN that classifies surnames by language of origin.
pub fn run<R: Rng + ?Sized>(config: &NamesConfig, rng: &mut R) -> Result<Summary> {
    config.validate()?;
    let corpus = NameCorpus::load_dir(&config.data_dir)?;
    let n_categories = corpus.n_categories();
    println!(
        "Names: {} names in {} categories from {}",
        corpus.samples.len(), n_categories, config.data_dir.display()
    );
    for (category, count) in corpus.categories.iter().zip(corpus.counts()) {
        println!("  {category:<12} {count:>6}");
    }

    let (train, test) = train_test_split(corpus.samples.clone(), config.test_fraction, rng)?;
    let encode = |samples: &[(String, usize)]| -> (Vec<Vec<Vec<f64>>>, Vec<Vec<f64>>) {
        samples.iter()
            .map(|(name, label)| (line_to_sequence(name), one_hot(*label, n_categories)))
            .unzip()
    };
    let (train_inputs, train_labels) = encode(&train[..]);
    let (test_inputs, test_labels) = encode(&test[..]);

    let mut model = CharRnn::new(N_LETTERS, config.hidden_size, n_categories, rng);
    println!(
        "RNN: {} letters -> {} hidden (tanh) -> {} categories; {} train / {} test",
        N_LETTERS, config.hidden_size, n_categories, train.len(), test.len()
    );

    let mut optimizer = config.optimizer.build();
    let train_config = TrainConfig::new(config.epochs, config.batch_size, LossType::CrossEntropy)
        .with_log_every(config.log_every)
        .with_clip_norm(config.clip_norm);
    let validation = (!test_inputs.is_empty())
        .then(|| (test_inputs.as_slice(), test_labels.as_slice()));
    let history = train_loop(
        &mut model,
        &train_inputs,
        &train_labels,
        validation,
        optimizer.as_mut(),
        &train_config,
        rng,
    )?;

    println!();
    report::print_epoch_table(&history, config.log_every);

    let test_accuracy = validation.map(|(vi, vl)| accuracy(&mut model, vi, vl));
    if let Some(acc) = test_accuracy {
        println!("\nTest accuracy: {:.2}% on {} names", acc * 100.0, test_inputs.len());
    }

    let (eval_inputs, eval_labels) = validation
        .unwrap_or((train_inputs.as_slice(), train_labels.as_slice()));
    let matrix = confusion_matrix(&mut model, eval_inputs, eval_labels, n_categories);
    report::print_confusion(&matrix, &corpus.categories);

    if config.plot {
        report::plot_loss_curve(&history);
    }

    for name in &config.predict {
        match predict_name(&mut model, &corpus.categories, name, 3) {
            Ok(ranked) => {
                println!("\n> {name}");
                for (category, p) in ranked {
                    println!("  ({:.2}) {}", p, category);
                }
            }
            Err(e) => tracing::warn!("skipping prediction: {e}"),
        }
    }

    if let Some(path) = &config.save_model {
        let metadata = ModelMetadata {
            description: Some("character-level RNN name classifier".into()),
            input_type: Some(InputType::CharSequence { alphabet: ALL_LETTERS.to_string() }),
            output_labels: Some(corpus.categories.clone()),
        };
        Checkpoint::new(model, metadata).save_json(path)?;
        println!("Model saved to {}", path.display());
    }

    Ok(Summary { history, test_accuracy })
}
