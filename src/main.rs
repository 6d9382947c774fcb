//! Demo de línea de comandos: arma un pipeline de frames, lo reconfigura en
//! caliente y muestra los resultados.
use futures_util::StreamExt;
use operator_pipeline::engine::{BoxError, PlainTransform};
use operator_pipeline::operators::{bind_sink, conditional, eventually, keyframe, Tween};
use operator_pipeline::{configured_pipeline, process_concurrently, CONFIG};
use tokio::sync::watch;
use tokio::time::Instant;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let frame = CONFIG.demo_frame;
    println!("--- {} ---", CONFIG.name);
    println!("Config: {}", serde_json::to_string(&*CONFIG).unwrap_or_default());

    let (tx, rx) = watch::channel(0.0f64);
    let pipeline = configured_pipeline::<f64>();
    pipeline.add(PlainTransform::sync(|v: f64| v * 2.0).named("double"));
    let clamp = pipeline.add(conditional(|v: &f64| *v > 100.0, |_| 100.0));
    pipeline.add(keyframe(vec![frame, frame * 2], |v: &f64| println!("  keyframe sobre {v}"), false));
    pipeline.add(bind_sink(Some(tx)));

    let steps = pipeline.snapshot().describe();
    println!("Steps: {}", serde_json::to_string(&steps).unwrap_or_default());

    let start = Instant::now();
    let out = pipeline.process_updates(80.0).await?;
    println!("80 -> {out} en {:?} (sink={})", start.elapsed(), *rx.borrow());

    clamp.toggle(Some(false));
    let out = pipeline.process_updates(80.0).await?;
    println!("80 sin clamp -> {out} (sink={})", *rx.borrow());

    clamp.remove();
    println!("Steps tras remove: {}", pipeline.snapshot().len());

    // llamadas concurrentes sobre un keyframe concurrente
    let overlapping = configured_pipeline::<u32>();
    overlapping.add(keyframe(frame, |_: &u32| {}, true));
    let start = Instant::now();
    let outs = process_concurrently(&overlapping, 0..4).await?;
    println!("{} llamadas concurrentes en {:?}", outs.len(), start.elapsed());

    // tween consumido directamente para ver los pasos intermedios
    let tween = Tween::new(frame * 10, 0.0f64, 1.0).on_complete(|| println!("  tween completo"));
    let steps: Vec<f64> = tween.play().filter_map(|r| async move { r.ok() }).collect().await;
    println!("Tween: {steps:?}");

    let settle = configured_pipeline::<f64>();
    settle.add(tween.into_operator());
    settle.add(eventually(|v: &f64| *v >= 1.0));
    println!("Tween en pipeline -> {}", settle.process_updates(0.0).await?);

    Ok(())
}
