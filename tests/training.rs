use nn_exercises::{
    data::{make_moons, one_hot},
    network::{Checkpoint, ModelMetadata},
    train::{accuracy, train_loop},
    ActivationFunction, Adam, Error, LossType, Model, Network, Sgd, TrainConfig,
};
use rand::{rngs::StdRng, SeedableRng};

fn moons(n: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = make_moons(n, 0.1, &mut rng);
    data.points.iter().zip(&data.labels)
        .map(|(p, &l)| (p.to_vec(), one_hot(l, 2)))
        .unzip()
}

fn small_net(rng: &mut StdRng) -> Network {
    Network::new(vec![
        (16, 2, ActivationFunction::ReLU),
        (2, 16, ActivationFunction::Softmax),
    ], rng)
}

#[test]
fn loss_decreases_and_accuracy_beats_chance() {
    let mut rng = StdRng::seed_from_u64(42);
    let (inputs, labels) = moons(200, 1);
    let mut net = small_net(&mut rng);
    let mut optimizer = Adam::new(0.02);
    let config = TrainConfig::new(40, 16, LossType::CrossEntropy).with_log_every(0);

    let history = train_loop(&mut net, &inputs, &labels, None, &mut optimizer, &config, &mut rng).unwrap();

    assert_eq!(history.len(), 40);
    assert!(history.last().unwrap().train_loss < history[0].train_loss);
    assert!(history.iter().all(|s| s.val_loss.is_none()));
    assert!(accuracy(&mut net, &inputs, &labels) > 0.8);
}

#[test]
fn validation_metrics_are_reported_every_epoch() {
    let mut rng = StdRng::seed_from_u64(3);
    let (inputs, labels) = moons(120, 2);
    let (val_inputs, val_labels) = moons(40, 9);
    let mut net = small_net(&mut rng);
    let mut optimizer = Sgd::with_momentum(0.05, 0.9);
    let config = TrainConfig::new(5, 8, LossType::CrossEntropy).with_clip_norm(Some(1.0));

    let history = train_loop(
        &mut net, &inputs, &labels,
        Some((val_inputs.as_slice(), val_labels.as_slice())),
        &mut optimizer, &config, &mut rng,
    ).unwrap();

    for (i, stats) in history.iter().enumerate() {
        assert_eq!(stats.epoch, i + 1);
        assert_eq!(stats.total_epochs, 5);
        assert!(stats.val_loss.unwrap().is_finite());
        let acc = stats.val_accuracy.unwrap();
        assert!((0.0..=1.0).contains(&acc));
    }
}

#[test]
fn bad_inputs_are_rejected_before_training() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut net = small_net(&mut rng);
    let mut optimizer = Sgd::new(0.1);
    let (inputs, labels) = moons(10, 0);
    let ok = TrainConfig::new(1, 4, LossType::CrossEntropy);

    let empty: Vec<Vec<f64>> = Vec::new();
    assert!(matches!(
        train_loop(&mut net, &empty, &empty, None, &mut optimizer, &ok, &mut rng),
        Err(Error::Data(_))
    ));
    assert!(matches!(
        train_loop(&mut net, &inputs, &labels[..5], None, &mut optimizer, &ok, &mut rng),
        Err(Error::Data(_))
    ));
    let weights_before = net.layers[0].weights.value.clone();
    let rejected = [
        TrainConfig::new(1, 0, LossType::CrossEntropy),
        TrainConfig::new(0, 4, LossType::CrossEntropy),
        TrainConfig::new(1, 4, LossType::CrossEntropy).with_clip_norm(Some(0.0)),
        TrainConfig::new(1, 4, LossType::CrossEntropy).with_clip_norm(Some(-1.0)),
        TrainConfig::new(1, 4, LossType::CrossEntropy).with_clip_norm(Some(f64::NAN)),
    ];
    for config in &rejected {
        assert!(matches!(
            train_loop(&mut net, &inputs, &labels, None, &mut optimizer, config, &mut rng),
            Err(Error::Config(_))
        ));
    }
    assert_eq!(net.layers[0].weights.value, weights_before);
}

#[test]
fn sigmoid_head_learns_with_binary_cross_entropy() {
    let mut rng = StdRng::seed_from_u64(8);
    let (inputs, one_hot_labels) = moons(200, 4);
    let labels: Vec<Vec<f64>> = one_hot_labels.iter().map(|l| vec![l[1]]).collect();
    let mut net = Network::new(vec![
        (16, 2, ActivationFunction::Tanh),
        (1, 16, ActivationFunction::Sigmoid),
    ], &mut rng);
    let mut optimizer = Adam::new(0.02);
    let config = TrainConfig::new(40, 16, LossType::BinaryCrossEntropy).with_log_every(0);

    let history = train_loop(&mut net, &inputs, &labels, None, &mut optimizer, &config, &mut rng).unwrap();

    assert!(history.last().unwrap().train_loss < history[0].train_loss);
    assert!(history.last().unwrap().train_accuracy > 0.8);
}

#[test]
fn checkpoint_restores_identical_predictions() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut net = small_net(&mut rng);
    let point = vec![0.4, -0.2];
    let before = net.forward(&point);

    let path = std::env::temp_dir()
        .join(format!("nn_exercises_ckpt_{}", std::process::id()))
        .join("moons.json");
    Checkpoint::new(net, ModelMetadata::default()).save_json(&path).unwrap();
    let mut restored: Checkpoint<Network> = Checkpoint::load_json(&path).unwrap();

    assert_eq!(restored.model.forward(&point), before);
    // Gradients are not persisted but training resumes cleanly.
    let grad = vec![0.1, -0.1];
    restored.model.backward(&grad);
    assert_eq!(restored.model.parameters_mut().len(), 4);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

/// Saves a valid checkpoint, lets `corrupt` edit its JSON, and reloads it.
fn reload_corrupted(name: &str, corrupt: impl FnOnce(&mut serde_json::Value)) -> Result<Checkpoint<Network>, Error> {
    let mut rng = StdRng::seed_from_u64(5);
    let dir = std::env::temp_dir().join(format!("nn_exercises_{name}_{}", std::process::id()));
    let path = dir.join("model.json");
    Checkpoint::new(small_net(&mut rng), ModelMetadata::default()).save_json(&path).unwrap();

    let mut json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    corrupt(&mut json);
    std::fs::write(&path, json.to_string()).unwrap();

    let loaded = Checkpoint::load_json(&path);
    std::fs::remove_dir_all(&dir).ok();
    loaded
}

#[test]
fn checkpoint_with_inconsistent_matrix_is_rejected() {
    let loaded = reload_corrupted("bad_matrix", |json| {
        // Declares 3 rows while the first layer's weights still hold 2.
        json["model"]["layers"][0]["weights"]["value"]["rows"] = 3.into();
    });
    assert!(matches!(loaded, Err(Error::Shape { .. })));

    let loaded = reload_corrupted("ragged_matrix", |json| {
        json["model"]["layers"][1]["weights"]["value"]["data"][0] = serde_json::json!([0.1]);
    });
    assert!(matches!(loaded, Err(Error::Shape { .. })));
}

#[test]
fn checkpoint_with_unchained_layers_is_rejected() {
    let loaded = reload_corrupted("unchained", |json| {
        let layers = json["model"]["layers"].as_array_mut().unwrap();
        // A self-consistent 2 -> 8 layer in front of a head that reads 16.
        let weights = vec![vec![0.0; 8]; 2];
        let biases = vec![vec![0.0; 8]];
        layers[0] = serde_json::json!({
            "size": 8,
            "input_size": 2,
            "weights": { "value": { "rows": 2, "cols": 8, "data": weights } },
            "biases": { "value": { "rows": 1, "cols": 8, "data": biases } },
            "activator": "ReLU"
        });
    });
    assert!(matches!(loaded, Err(Error::Config(_))));
}
