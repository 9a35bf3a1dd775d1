//! In-place updates of Chart.js instances.
//!
//! The page template owns chart construction. A refresh looks the instance up
//! by canvas id (`Chart.getChart(id)`), replaces `data.labels` and each
//! dataset's `data`, then calls `update()`. Series are validated before any
//! of that so a malformed payload never leaves a chart half-updated.

use js_sys::{Array, Function, Reflect};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("dataset {index} has {found} points for {expected} labels")]
    LengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("chart update failed: {0}")]
    Js(String),
}

impl From<JsValue> for ChartError {
    fn from(e: JsValue) -> Self {
        ChartError::Js(format!("{:?}", e))
    }
}

impl From<serde_wasm_bindgen::Error> for ChartError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        ChartError::Js(e.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<Vec<f64>>,
}

impl ChartSeries {
    pub fn new(labels: Vec<String>, datasets: Vec<Vec<f64>>) -> Self {
        Self { labels, datasets }
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        let expected = self.labels.len();
        for (index, data) in self.datasets.iter().enumerate() {
            if data.len() != expected {
                return Err(ChartError::LengthMismatch {
                    index,
                    expected,
                    found: data.len(),
                });
            }
        }
        Ok(())
    }
}

/// Look up the Chart.js instance attached to `canvas_id`.
fn find_chart(canvas_id: &str) -> Result<Option<JsValue>, JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(None);
    };
    let chart_ctor = Reflect::get(&window, &JsValue::from_str("Chart"))?;
    if chart_ctor.is_undefined() {
        return Ok(None);
    }
    let get_chart: Function = Reflect::get(&chart_ctor, &JsValue::from_str("getChart"))?.dyn_into()?;
    let chart = get_chart.call1(&chart_ctor, &JsValue::from_str(canvas_id))?;
    Ok((!chart.is_undefined() && !chart.is_null()).then_some(chart))
}

/// Replace the chart's data. Returns `false` when the page has no chart on
/// that canvas (the template omitted it or Chart.js is not loaded).
pub fn update_chart(canvas_id: &str, series: &ChartSeries) -> Result<bool, ChartError> {
    series.validate()?;
    let Some(chart) = find_chart(canvas_id)? else {
        return Ok(false);
    };

    let data = Reflect::get(&chart, &JsValue::from_str("data"))?;
    let labels = serde_wasm_bindgen::to_value(&series.labels)?;
    Reflect::set(&data, &JsValue::from_str("labels"), &labels)?;

    let datasets: Array = Reflect::get(&data, &JsValue::from_str("datasets"))?.dyn_into()?;
    for (i, values) in series.datasets.iter().enumerate() {
        let dataset = datasets.get(i as u32);
        if dataset.is_undefined() {
            log::warn!("chart {} has no dataset {}", canvas_id, i);
            continue;
        }
        let points = serde_wasm_bindgen::to_value(values)?;
        Reflect::set(&dataset, &JsValue::from_str("data"), &points)?;
    }

    let update: Function = Reflect::get(&chart, &JsValue::from_str("update"))?.dyn_into()?;
    update.call0(&chart)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_lengths_validate() {
        let s = ChartSeries::new(
            vec!["lun".into(), "mar".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        );
        assert!(s.validate().is_ok());
    }

    #[test]
    fn mismatched_dataset_is_rejected() {
        let s = ChartSeries::new(vec!["a".into(), "b".into()], vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(
            s.validate(),
            Err(ChartError::LengthMismatch {
                index: 1,
                expected: 2,
                found: 1
            })
        );
    }
}
