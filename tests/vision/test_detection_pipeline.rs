// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detection post-processing on synthetic YOLOv8 output

use image::DynamicImage;
use ndarray::Array3;
use visual_assistant::vision::detection::labels::{coco_labels, label_for};
use visual_assistant::vision::detection::postprocess::{
    decode_output, non_max_suppression, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD,
};
use visual_assistant::vision::detection::preprocessing::{preprocess_for_yolo, YOLO_INPUT_SIZE};
use visual_assistant::vision::detection::{unique_labels, BoundingBox, Detection};

const NUM_CLASSES: usize = 80;

/// Empty anchors pad the tensor so anchors outnumber attributes, as in
/// real exports
const MIN_ANCHORS: usize = 128;

/// Build a `[1, 84, anchors]` tensor from (cx, cy, w, h, class, score)
fn yolo_output(anchors: &[(f32, f32, f32, f32, usize, f32)]) -> Array3<f32> {
    let columns = anchors.len().max(MIN_ANCHORS);
    let mut output = Array3::<f32>::zeros((1, 4 + NUM_CLASSES, columns));
    for (i, &(cx, cy, w, h, class_id, score)) in anchors.iter().enumerate() {
        output[[0, 0, i]] = cx;
        output[[0, 1, i]] = cy;
        output[[0, 2, i]] = w;
        output[[0, 3, i]] = h;
        output[[0, 4 + class_id, i]] = score;
    }
    output
}

fn to_detections(output: &Array3<f32>) -> Vec<Detection> {
    let labels = coco_labels();
    let candidates = decode_output(&output.view().into_dyn(), DEFAULT_CONFIDENCE_THRESHOLD).unwrap();
    non_max_suppression(candidates, DEFAULT_IOU_THRESHOLD)
        .into_iter()
        .map(|c| Detection {
            label: label_for(&labels, c.class_id),
            class_id: c.class_id,
            confidence: c.confidence,
            bounding_box: BoundingBox {
                x: c.bbox[0] as u32,
                y: c.bbox[1] as u32,
                width: (c.bbox[2] - c.bbox[0]) as u32,
                height: (c.bbox[3] - c.bbox[1]) as u32,
            },
        })
        .collect()
}

/// Test 1: Overlapping boxes of one class merge; distinct objects survive
#[test]
fn test_pipeline_yields_unique_names() {
    let output = yolo_output(&[
        (100.0, 100.0, 80.0, 160.0, 0, 0.92),  // person
        (102.0, 101.0, 80.0, 160.0, 0, 0.85),  // same person, suppressed
        (400.0, 300.0, 80.0, 160.0, 0, 0.70),  // second person
        (250.0, 450.0, 120.0, 90.0, 16, 0.66), // dog
        (500.0, 500.0, 50.0, 50.0, 2, 0.10),   // car below threshold
    ]);

    let detections = to_detections(&output);
    assert_eq!(detections.len(), 3);
    assert_eq!(detections[0].label, "person");
    assert!(detections[0].confidence >= detections[1].confidence);

    let objects = unique_labels(&detections);
    assert_eq!(objects, vec!["person".to_string(), "dog".to_string()]);
}

/// Test 2: Transposed export layout decodes to the same detections
#[test]
fn test_pipeline_transposed_layout() {
    let output = yolo_output(&[
        (100.0, 100.0, 80.0, 160.0, 0, 0.92),
        (250.0, 450.0, 120.0, 90.0, 16, 0.66),
    ]);
    let transposed = output.permuted_axes([0, 2, 1]).to_owned();

    let labels = coco_labels();
    let candidates =
        decode_output(&transposed.view().into_dyn(), DEFAULT_CONFIDENCE_THRESHOLD).unwrap();
    let mut names: Vec<String> = candidates
        .iter()
        .map(|c| label_for(&labels, c.class_id))
        .collect();
    names.sort();
    assert_eq!(names, vec!["dog".to_string(), "person".to_string()]);
}

/// Test 3: Empty scene yields no objects
#[test]
fn test_pipeline_nothing_detected() {
    let output = yolo_output(&[(320.0, 320.0, 10.0, 10.0, 5, 0.01)]);
    let detections = to_detections(&output);
    assert!(detections.is_empty());
    assert!(unique_labels(&detections).is_empty());
}

/// Test 4: Preprocessing produces the model input shape for any aspect ratio
#[test]
fn test_preprocess_shape_for_wide_image() {
    let image = DynamicImage::new_rgb8(1280, 320);
    let (tensor, letterbox) = preprocess_for_yolo(&image);

    let size = YOLO_INPUT_SIZE as usize;
    assert_eq!(tensor.shape(), &[1, 3, size, size]);
    assert!((letterbox.scale - 0.5).abs() < 1e-6);
    assert_eq!(letterbox.pad_x, 0.0);
    assert!(letterbox.pad_y > 0.0);
}
