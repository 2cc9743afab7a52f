use std::fmt::Write as _;
use std::path::Path;

use rand::Rng;

use crate::{
    config::AgesConfig,
    data::{
        ages::{read_id_csv, AgeGroup, ImageTensorSet},
        image::image_to_tensor,
        one_hot, train_test_split,
    },
    error::{Error, Result},
    exercises::Summary,
    loss::LossType,
    math::tensor::Tensor3,
    models::{AgeCnn, Model},
    network::{Checkpoint, InputType, ModelMetadata},
    report,
    train::{accuracy, argmax, confusion_matrix, train_loop, TrainConfig},
};

/// Loads the preprocessed tensors from the cache when it exists, otherwise
/// decodes the images (and fills the cache if one was named).
pub fn load_image_set(config: &AgesConfig) -> Result<ImageTensorSet> {
    if let Some(cache) = config.tensor_cache.as_deref().filter(|p| p.exists()) {
        tracing::info!(path = %cache.display(), "reading preprocessed tensors");
        return ImageTensorSet::load_json(cache);
    }

    let set = ImageTensorSet::from_directory(
        &config.labels_csv,
        &config.image_dir,
        config.image_size,
        config.image_size,
        config.limit,
    )?;
    if let Some(cache) = &config.tensor_cache {
        set.save_json(cache)?;
        tracing::info!(path = %cache.display(), "cached preprocessed tensors");
    }
    Ok(set)
}

/// Most likely age group for one image.
pub fn classify(model: &mut AgeCnn, image: &Tensor3) -> Result<AgeGroup> {
    model.check_input(image)?;
    let probabilities = model.forward(image);
    AgeGroup::from_index(argmax(&probabilities))
        .ok_or_else(|| Error::data("model produced an unknown class index"))
}

/// Classifies every image listed in `ids_csv` and writes `ID,Class` rows.
pub fn write_predictions(
    model: &mut AgeCnn,
    ids_csv: &Path,
    image_dir: &Path,
    (width, height): (u32, u32),
    out: &Path,
) -> Result<usize> {
    let ids = read_id_csv(ids_csv)?;
    let mut text = String::from("ID,Class\n");
    for id in &ids {
        let image = image_to_tensor(&image_dir.join(id), width, height)?;
        let group = classify(model, &image)?;
        // Writing into a String cannot fail.
        let _ = writeln!(text, "{id},{group}");
    }
    std::fs::write(out, text).map_err(|e| Error::io(out, e))?;
    Ok(ids.len())
}

/// Convolutional network that sorts face images into age groups.
pub fn run<R: Rng + ?Sized>(config: &AgesConfig, rng: &mut R) -> Result<Summary> {
    config.validate()?;
    let set = load_image_set(config)?;
    if set.is_empty() {
        return Err(Error::data("no images to train on"));
    }
    let labels = AgeGroup::labels();
    let n_classes = labels.len();
    println!(
        "Ages: {} images of {}x{}x{}",
        set.len(), set.channels(), set.height, set.width
    );

    let samples: Vec<(String, Tensor3, AgeGroup)> = set.ids.iter().cloned()
        .zip(set.images.iter().cloned())
        .zip(set.labels.iter().copied())
        .map(|((id, image), group)| (id, image, group))
        .collect();
    let (train, test) = train_test_split(samples, config.test_fraction, rng)?;

    let split = |samples: &[(String, Tensor3, AgeGroup)]| -> (Vec<Tensor3>, Vec<Vec<f64>>) {
        samples.iter()
            .map(|(_, image, group)| (image.clone(), one_hot(group.index(), n_classes)))
            .unzip()
    };
    let (train_inputs, train_labels) = split(&train[..]);
    let (test_inputs, test_labels) = split(&test[..]);

    let mut model = AgeCnn::new(set.channels(), set.height, set.width, n_classes, rng)?;
    println!("CNN: conv16 -> pool -> conv32 -> pool -> dense64 -> {n_classes}; {} train / {} test", train.len(), test.len());

    let mut optimizer = config.optimizer.build();
    let train_config = TrainConfig::new(config.epochs, config.batch_size, LossType::CrossEntropy)
        .with_log_every(config.log_every);
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

    let shown: Vec<(String, String, String)> = test.iter()
        .take(config.show_predictions)
        .map(|(id, image, truth)| -> Result<(String, String, String)> {
            let predicted = classify(&mut model, image)?;
            Ok((id.clone(), truth.to_string(), predicted.to_string()))
        })
        .collect::<Result<_>>()?;
    if !shown.is_empty() {
        println!("\nSample predictions:");
        report::print_predictions(&shown);
    }

    let test_accuracy = validation.map(|(vi, vl)| accuracy(&mut model, vi, vl));
    if let Some((vi, vl)) = validation {
        let matrix = confusion_matrix(&mut model, vi, vl, n_classes);
        report::print_confusion(&matrix, &labels);
    }
    if let Some(acc) = test_accuracy {
        println!("\nTest accuracy: {:.2}% on {} images", acc * 100.0, test_inputs.len());
    }

    if config.plot {
        report::plot_loss_curve(&history);
    }

    if let Some(ids_csv) = &config.predict_csv {
        let image_dir = config.predict_image_dir.as_deref().unwrap_or(&config.image_dir);
        let n = write_predictions(
            &mut model,
            ids_csv,
            image_dir,
            (set.width as u32, set.height as u32),
            &config.predictions_out,
        )?;
        println!("Wrote {n} predictions to {}", config.predictions_out.display());
    }

    if let Some(path) = &config.save_model {
        let metadata = ModelMetadata {
            description: Some("age-group CNN".into()),
            input_type: Some(InputType::ImageRgb { width: set.width as u32, height: set.height as u32 }),
            output_labels: Some(labels.clone()),
        };
        Checkpoint::new(model, metadata).save_json(path)?;
        println!("Model saved to {}", path.display());
    }

    Ok(Summary { history, test_accuracy })
}
