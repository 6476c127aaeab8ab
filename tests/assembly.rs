//! End-to-end assembly: arguments → sections → callback set → trainer kwargs

use afinar::config::{CallbackSpec, DataConfig, LoggingInterval};
use afinar::train::{TrainContext, TrainingCallback};
use afinar::{
    callback_specs, data_config, factory, harness_config, model_config, run_config,
    trainer_config, trainer_kwargs, Error, RunArguments, RunPaths,
};
use std::path::PathBuf;

fn args_for(save_every_x_steps: u32, regularization_images: Option<&str>) -> RunArguments {
    RunArguments {
        project_name: "sks-dog".to_string(),
        learning_rate: 1e-6,
        save_every_x_steps,
        max_training_steps: 800,
        training_model: PathBuf::from("sd-v1-5.ckpt"),
        training_images: PathBuf::from("./subject"),
        regularization_images: regularization_images.map(PathBuf::from),
        token: "sks".to_string(),
        token_only: false,
        class_word: "dog".to_string(),
        flip_p: 0.5,
        seed: 23,
        debug: false,
    }
}

#[test]
fn assembles_minimal_run() {
    let args = args_for(0, None);
    let paths = RunPaths::with_run_name("logs", "2024-03-01T10-00-00_sks-dog");

    let model = model_config(&args);
    let data = data_config(&args);
    let harness = harness_config(&args, &paths);
    let config = run_config(model.clone(), data, harness.clone());

    let trainer = trainer_config(&model.describe(), &args, &paths, &harness);
    let callbacks = callback_specs(&args, &paths, &config, &harness);
    let kwargs = trainer_kwargs(&args, &trainer, &callbacks).unwrap();

    assert_eq!(kwargs.max_steps, 800);
    assert_eq!(kwargs.callbacks.len(), 5);
    assert_eq!(kwargs.logger.save_dir(), paths.log_dir());

    let names: Vec<&str> = kwargs.callbacks.iter().map(|cb| cb.name()).collect();
    assert_eq!(
        names,
        vec![
            "SetupCallback",
            "ImageLogger",
            "LearningRateLogger",
            "CudaCallback",
            "ModelCheckpoint"
        ]
    );
}

#[test]
fn assembles_run_with_interval_and_regularization() {
    let args = args_for(250, Some("./class-images"));
    let paths = RunPaths::with_run_name("logs", "2024-03-01T10-00-00_sks-dog");

    let DataConfig::DataModule(data_params) = data_config(&args);
    assert!(data_params.reg.is_some());

    let model = model_config(&args);
    let harness = harness_config(&args, &paths);
    assert!(harness
        .callbacks
        .metrics_over_trainsteps_checkpoint
        .is_some());

    let config = run_config(model.clone(), data_config(&args), harness.clone());
    let trainer = trainer_config(&model.describe(), &args, &paths, &harness);
    let callbacks = callback_specs(&args, &paths, &config, &harness);
    let kwargs = trainer_kwargs(&args, &trainer, &callbacks).unwrap();

    // The interval checkpoint rides along at the end of the callback list
    assert_eq!(kwargs.callbacks.len(), 6);
    assert_eq!(kwargs.callbacks[5].name(), "ModelCheckpoint");
}

#[test]
fn live_callbacks_run_against_a_tempdir() {
    let dir = tempfile::tempdir().unwrap();
    let args = args_for(2, None);
    let paths = RunPaths::with_run_name(dir.path(), "run");

    let model = model_config(&args);
    let data = data_config(&args);
    let harness = harness_config(&args, &paths);
    let config = run_config(model.clone(), data, harness.clone());
    let trainer = trainer_config(&model.describe(), &args, &paths, &harness);
    let callbacks = callback_specs(&args, &paths, &config, &harness);
    let mut kwargs = trainer_kwargs(&args, &trainer, &callbacks).unwrap();

    let mut ctx = TrainContext {
        max_steps: args.max_training_steps as usize,
        lr: args.learning_rate,
        ..Default::default()
    };

    for callback in &mut kwargs.callbacks {
        callback.on_train_begin(&ctx).unwrap();
    }
    for step in 1..=4 {
        ctx.global_step = step;
        for callback in &mut kwargs.callbacks {
            callback.on_step_end(&ctx).unwrap();
        }
    }

    // Setup created the run layout and snapshotted the configs
    assert!(paths.config_dir().join("run-project.yaml").exists());
    assert!(paths.config_dir().join("run-harness.yaml").exists());

    // The interval checkpoint wrote weights-only markers every 2 steps
    let intermediate = paths.intermediate_checkpoint_dir();
    assert!(intermediate.join("000000-000000002.ckpt").exists());
    assert!(intermediate.join("000000-000000004.ckpt").exists());

    // The logger writes under the run's log directory
    kwargs.logger.log_metrics(4, &[("loss", 0.25)]).unwrap();
    assert!(paths.log_dir().join("csv/metrics.csv").exists());
}

#[test]
fn snapshotted_specs_resolve_through_the_value_factory() {
    let args = args_for(250, None);
    let paths = RunPaths::with_run_name("logs", "run");
    let harness = harness_config(&args, &paths);
    let config = run_config(model_config(&args), data_config(&args), harness.clone());
    let set = callback_specs(&args, &paths, &config, &harness);

    for spec in set.specs() {
        let value = serde_yaml::to_value(spec).unwrap();
        let callback = factory::callback_from_value(&value).unwrap();
        assert!(!callback.name().is_empty());
    }
}

#[test]
fn plain_data_sections_are_rejected_by_the_value_factory() {
    let args = args_for(0, None);
    let paths = RunPaths::with_run_name("logs", "run");
    let harness = harness_config(&args, &paths);

    // The checkpoint-interval override is data, not a directive
    let value = serde_yaml::to_value(&harness.checkpoint_defaults).unwrap();
    let err = factory::callback_from_value(&value).unwrap_err();
    assert!(matches!(err, Error::MissingTarget));
}

#[test]
fn learning_rate_logger_defaults_to_per_step() {
    let args = args_for(0, None);
    let paths = RunPaths::with_run_name("logs", "run");
    let harness = harness_config(&args, &paths);
    let config = run_config(model_config(&args), data_config(&args), harness.clone());
    let set = callback_specs(&args, &paths, &config, &harness);

    let CallbackSpec::LearningRateLogger(params) = &set.learning_rate_logger else {
        panic!("expected a learning rate logger spec");
    };
    assert_eq!(params.logging_interval, LoggingInterval::Step);
}
