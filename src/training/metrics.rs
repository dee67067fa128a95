//! Test-set evaluation: accuracy, per-class report and confusion matrix.

use tabled::{Table, Tabled};

use crate::error::{GazemoodError, Result};

/// Per-class precision/recall/F1
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Tabled)]
struct ReportRow {
    class: String,
    precision: String,
    recall: String,
    f1: String,
    support: usize,
}

impl From<&ClassMetrics> for ReportRow {
    fn from(m: &ClassMetrics) -> Self {
        Self {
            class: m.label.clone(),
            precision: format!("{:.3}", m.precision),
            recall: format!("{:.3}", m.recall),
            f1: format!("{:.3}", m.f1),
            support: m.support,
        }
    }
}

/// Evaluation summary over a labelled split
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Overall accuracy
    pub accuracy: f64,
    /// One row per class, in persisted class order
    pub per_class: Vec<ClassMetrics>,
    /// confusion[true][pred] counts
    pub confusion: Vec<Vec<usize>>,
    /// Class labels, row/column order of the confusion matrix
    pub classes: Vec<String>,
}

/// Compute accuracy, per-class metrics and the confusion matrix.
pub fn evaluate(y_true: &[usize], y_pred: &[usize], classes: &[String]) -> Result<Evaluation> {
    if y_true.len() != y_pred.len() {
        return Err(GazemoodError::Validation(format!(
            "Prediction count {} != label count {}",
            y_pred.len(),
            y_true.len()
        )));
    }
    if y_true.is_empty() {
        return Err(GazemoodError::Validation(
            "Cannot evaluate an empty split".to_string(),
        ));
    }

    let k = classes.len();
    let mut confusion = vec![vec![0usize; k]; k];
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        if t >= k || p >= k {
            return Err(GazemoodError::Validation(format!(
                "Class index out of range: true {}, pred {}, classes {}",
                t, p, k
            )));
        }
        confusion[t][p] += 1;
    }

    let correct: usize = (0..k).map(|i| confusion[i][i]).sum();
    let accuracy = correct as f64 / y_true.len() as f64;

    let per_class = classes
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let tp = confusion[i][i];
            let support: usize = confusion[i].iter().sum();
            let predicted: usize = (0..k).map(|t| confusion[t][i]).sum();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            ClassMetrics {
                label: label.clone(),
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect();

    Ok(Evaluation {
        accuracy,
        per_class,
        confusion,
        classes: classes.to_vec(),
    })
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

impl Evaluation {
    /// Classification report rendered as a table
    pub fn report_table(&self) -> String {
        let rows: Vec<ReportRow> = self.per_class.iter().map(ReportRow::from).collect();
        Table::new(rows).to_string()
    }

    /// Confusion matrix as CSV, header row/column labelled with classes
    pub fn confusion_csv(&self) -> String {
        let mut out = String::from("true\\pred");
        for label in &self.classes {
            out.push(',');
            out.push_str(label);
        }
        out.push('\n');
        for (i, row) in self.confusion.iter().enumerate() {
            out.push_str(&self.classes[i]);
            for count in row {
                out.push(',');
                out.push_str(&count.to_string());
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<String> {
        vec!["boredom".to_string(), "focus".to_string()]
    }

    #[test]
    fn perfect_predictions_score_one() {
        let eval = evaluate(&[0, 1, 0, 1], &[0, 1, 0, 1], &classes()).unwrap();
        assert_eq!(eval.accuracy, 1.0);
        assert_eq!(eval.per_class[0].precision, 1.0);
        assert_eq!(eval.per_class[1].recall, 1.0);
        assert_eq!(eval.confusion, vec![vec![2, 0], vec![0, 2]]);
    }

    #[test]
    fn mixed_predictions_produce_expected_counts() {
        // true 0 predicted as 1 once
        let eval = evaluate(&[0, 0, 1, 1], &[0, 1, 1, 1], &classes()).unwrap();
        assert_eq!(eval.accuracy, 0.75);
        assert_eq!(eval.confusion[0], vec![1, 1]);
        assert_eq!(eval.per_class[0].recall, 0.5);
        // precision for class 1: 2 of 3 predicted
        assert!((eval.per_class[1].precision - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn absent_class_gets_zero_metrics_not_nan() {
        let eval = evaluate(&[0, 0], &[0, 0], &classes()).unwrap();
        let focus = &eval.per_class[1];
        assert_eq!(focus.support, 0);
        assert_eq!(focus.precision, 0.0);
        assert_eq!(focus.f1, 0.0);
    }

    #[test]
    fn confusion_csv_is_labelled() {
        let eval = evaluate(&[0, 1], &[1, 1], &classes()).unwrap();
        let csv = eval.confusion_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("true\\pred,boredom,focus"));
        assert_eq!(lines.next(), Some("boredom,0,1"));
        assert_eq!(lines.next(), Some("focus,0,1"));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(evaluate(&[0, 1], &[0], &classes()).is_err());
    }
}
