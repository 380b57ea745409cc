use crate::core::dataset::Dataset;
use crate::testing::dummies::{header_class_first, header_single_numeric};

/// Three ordinal bands on `x`: class 0 for x < 1, class 1 for 1 <= x < 2, class 2 above.
pub fn banded_dataset(per_class: usize) -> Dataset {
    let mut data = Dataset::new(header_single_numeric(3));
    for class in 0..3 {
        for i in 0..per_class {
            let x = class as f64 + 0.05 + 0.9 * (i as f64) / (per_class as f64);
            data.push_values(vec![x, class as f64], 1.0)
                .expect("row matches header");
        }
    }
    data
}

/// `num_classes` ordinal classes, each living on one value of a nominal attribute.
pub fn nominal_dataset(num_classes: usize, per_class: usize) -> Dataset {
    let mut data = Dataset::new(header_class_first(num_classes, num_classes));
    for class in 0..num_classes {
        for _ in 0..per_class {
            data.push_values(vec![class as f64, class as f64], 1.0)
                .expect("row matches header");
        }
    }
    data
}

/// Labels only, all with `x = 0`, so no attribute can split them.
pub fn unsplittable_dataset(labels: &[usize], num_classes: usize) -> Dataset {
    let mut data = Dataset::new(header_single_numeric(num_classes));
    for &label in labels {
        data.push_values(vec![0.0, label as f64], 1.0)
            .expect("row matches header");
    }
    data
}
