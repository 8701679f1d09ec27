//! Request pipeline: parse -> validate -> encode -> scale -> predict -> decode.

use crate::models::features::assemble;
use crate::models::{FeatureVector, FEATURE_COLUMNS, GENDER_COLUMN, N_NUMERIC};
use crate::services::artifacts::ArtifactBundle;
use crate::services::error::PredictionError;
use crate::services::metrics::{record_prediction, record_prediction_error};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Predictor {
    artifacts: Arc<ArtifactBundle>,
}

impl Predictor {
    pub fn new(artifacts: Arc<ArtifactBundle>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &ArtifactBundle {
        &self.artifacts
    }

    /// Run the whole pipeline on a raw JSON request body.
    pub fn predict_body(&self, body: &[u8]) -> Result<String, PredictionError> {
        let result = parse_body(body)
            .and_then(|payload| self.parse_features(&payload))
            .and_then(|features| self.predict(&features));

        match &result {
            Ok(category) => record_prediction(category),
            Err(e) => record_prediction_error(e.kind()),
        }

        result
    }

    /// Validate fields in fitted column order; the first failure wins and
    /// gender membership is checked only once every numeric field parsed.
    pub fn parse_features(
        &self,
        payload: &Map<String, Value>,
    ) -> Result<FeatureVector, PredictionError> {
        let mut numeric = [0.0; N_NUMERIC];
        let mut next_numeric = 0;
        let mut gender = None;

        for column in FEATURE_COLUMNS {
            let value = payload
                .get(column)
                .ok_or(PredictionError::MissingField(column))?;

            if column == GENDER_COLUMN {
                gender = Some(value);
            } else {
                numeric[next_numeric] = parse_number(column, value)?;
                next_numeric += 1;
            }
        }

        let gender = match gender {
            Some(Value::String(s)) if self.artifacts.gender_encoder().transform(s).is_some() => {
                s.clone()
            }
            Some(other) => return Err(PredictionError::InvalidGender(render(other))),
            None => return Err(PredictionError::MissingField(GENDER_COLUMN)),
        };

        Ok(FeatureVector { gender, numeric })
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<String, PredictionError> {
        let gender_code = self
            .artifacts
            .gender_encoder()
            .transform(&features.gender)
            .ok_or_else(|| PredictionError::InvalidGender(features.gender.clone()))?;

        let scaled = self.artifacts.scaler().transform(&features.numeric);
        let input = assemble(gender_code, &scaled);

        let class_index = self.artifacts.model().predict(&input)?;

        self.artifacts
            .category_encoder()
            .inverse_transform(class_index)
            .map(str::to_string)
            .ok_or(PredictionError::UnknownClass(class_index))
    }
}

/// Decode the request body into a non-empty JSON object.
pub fn parse_body(body: &[u8]) -> Result<Map<String, Value>, PredictionError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PredictionError::EmptyPayload);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| PredictionError::InvalidJson(e.to_string()))?;

    if is_falsy(&value) {
        return Err(PredictionError::EmptyPayload);
    }

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PredictionError::NotAnObject),
    }
}

/// `null`, `false`, zero, and empty strings, arrays and objects all count as
/// "no data".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Accepts JSON numbers and numeric strings (browsers post form values as
/// strings). Non-finite results are rejected.
fn parse_number(field: &'static str, value: &Value) -> Result<f64, PredictionError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| PredictionError::InvalidNumber {
            field,
            value: render(value),
        })
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::N_FEATURES;
    use crate::services::classifier::{Classifier, ModelError};
    use crate::services::encoder::{LabelEncoder, LabelEncoderArtifact};
    use crate::services::scaler::{ScalerArtifact, StandardScaler};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns a fixed class and remembers the last input it saw.
    struct RecordingClassifier {
        class: usize,
        calls: AtomicUsize,
        last_input: Mutex<Option<[f64; N_FEATURES]>>,
    }

    impl Classifier for RecordingClassifier {
        fn predict(&self, features: &[f64; N_FEATURES]) -> Result<usize, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_input.lock().unwrap() = Some(*features);
            Ok(self.class)
        }

        fn n_classes(&self) -> usize {
            2
        }

        fn kind(&self) -> &'static str {
            "recording"
        }
    }

    fn encoder(classes: &[&str]) -> LabelEncoder {
        LabelEncoder::from_artifact(LabelEncoderArtifact {
            classes: classes.iter().map(|c| c.to_string()).collect(),
        })
        .unwrap()
    }

    fn predictor_with(class: usize) -> (Predictor, Arc<RecordingClassifier>) {
        let model = Arc::new(RecordingClassifier {
            class,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        });
        let scaler = StandardScaler::from_artifact(ScalerArtifact {
            feature_names: None,
            mean: vec![20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            scale: vec![2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        })
        .unwrap();
        // The stub reports two classes; the third label is never emitted.
        let bundle = ArtifactBundle::new(
            model.clone(),
            scaler,
            encoder(&["Female", "Male", "Other"]),
            encoder(&["Music", "Sports", "Technology"]),
        )
        .unwrap();
        (Predictor::new(Arc::new(bundle)), model)
    }

    fn valid_payload() -> Value {
        json!({
            "age": 24,
            "gender": "Male",
            "tech_spend": 3,
            "music_freq": "4",
            "sports_hours": 1.5,
            "business_interest": 2,
            "edu_freq": 5,
            "food_interest": 1,
            "health_priority": 3
        })
    }

    fn body(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn encodes_scales_and_decodes() {
        let (predictor, model) = predictor_with(1);
        let label = predictor.predict_body(&body(&valid_payload())).unwrap();
        assert_eq!(label, "Sports");

        let input = model.last_input.lock().unwrap().unwrap();
        assert_eq!(input, [2.0, 1.0, 3.0, 4.0, 1.5, 2.0, 5.0, 1.0, 3.0]);
    }

    #[test]
    fn first_missing_field_in_column_order_is_reported() {
        let (predictor, model) = predictor_with(0);
        let mut payload = valid_payload();
        let map = payload.as_object_mut().unwrap();
        map.remove("edu_freq");
        map.remove("tech_spend");

        let err = predictor.predict_body(&body(&payload)).unwrap_err();
        assert!(matches!(err, PredictionError::MissingField("tech_spend")));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_gender_never_reaches_model() {
        let (predictor, model) = predictor_with(0);
        let mut payload = valid_payload();
        payload["gender"] = json!("unknown_value");

        let err = predictor.predict_body(&body(&payload)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid gender value: unknown_value");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_string_gender_is_rendered_as_json() {
        let (predictor, _) = predictor_with(0);
        let mut payload = valid_payload();
        payload["gender"] = json!(1);

        let err = predictor.predict_body(&body(&payload)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid gender value: 1");
    }

    #[test]
    fn numeric_errors_win_over_gender_errors() {
        let (predictor, model) = predictor_with(0);
        let mut payload = valid_payload();
        payload["gender"] = json!("unknown_value");
        payload["health_priority"] = json!("lots");

        let err = predictor.predict_body(&body(&payload)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid numeric value for 'health_priority': lots"
        );
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rejects_non_numeric_and_non_finite_values() {
        let (predictor, model) = predictor_with(0);
        for bad in [json!("abc"), json!("NaN"), json!("inf"), json!(null), json!(true), json!([1])] {
            let mut payload = valid_payload();
            payload["age"] = bad;
            let err = predictor.predict_body(&body(&payload)).unwrap_err();
            assert!(
                matches!(err, PredictionError::InvalidNumber { field: "age", .. }),
                "unexpected error: {err}"
            );
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn accepts_padded_numeric_strings() {
        let (predictor, model) = predictor_with(0);
        let mut payload = valid_payload();
        payload["age"] = json!(" 30 ");
        predictor.predict_body(&body(&payload)).unwrap();
        assert_eq!(model.last_input.lock().unwrap().unwrap()[0], 5.0);
    }

    #[test]
    fn payload_shape_errors() {
        assert!(matches!(parse_body(b""), Err(PredictionError::EmptyPayload)));
        assert!(matches!(parse_body(b"  \n"), Err(PredictionError::EmptyPayload)));
        assert!(matches!(parse_body(b"null"), Err(PredictionError::EmptyPayload)));
        assert!(matches!(parse_body(b"{}"), Err(PredictionError::EmptyPayload)));
        let falsy_bodies: [&[u8]; 5] = [b"[]", b"0", b"0.0", b"false", b"\"\""];
        for falsy in falsy_bodies {
            assert!(
                matches!(parse_body(falsy), Err(PredictionError::EmptyPayload)),
                "body {:?}",
                String::from_utf8_lossy(falsy)
            );
        }
        assert!(matches!(parse_body(b"[1, 2]"), Err(PredictionError::NotAnObject)));
        assert!(matches!(parse_body(b"1"), Err(PredictionError::NotAnObject)));
        assert!(matches!(parse_body(b"true"), Err(PredictionError::NotAnObject)));
        assert!(matches!(parse_body(b"\"x\""), Err(PredictionError::NotAnObject)));
        assert!(matches!(parse_body(b"{\"age\":"), Err(PredictionError::InvalidJson(_))));
    }

    #[test]
    fn undecodable_class_is_internal() {
        let (predictor, _) = predictor_with(5);
        let err = predictor.predict_body(&body(&valid_payload())).unwrap_err();
        assert!(matches!(err, PredictionError::UnknownClass(5)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn same_input_same_prediction() {
        let (predictor, _) = predictor_with(2);
        let payload = body(&valid_payload());
        let first = predictor.predict_body(&payload).unwrap();
        let second = predictor.predict_body(&payload).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "Technology");
    }
}
