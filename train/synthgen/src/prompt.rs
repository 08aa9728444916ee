use scene::{SceneDescription, ShapeKind};

pub fn shape_description(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::Circle => "circular",
        ShapeKind::Square => "square",
        ShapeKind::Triangle => "triangular",
        ShapeKind::Star => "star-shaped",
    }
}

fn shape_appearance(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::Circle => "a filled circle",
        ShapeKind::Square => "a filled square",
        ShapeKind::Triangle => "a filled equilateral triangle",
        ShapeKind::Star => "a filled five-pointed star",
    }
}

/// Instruction text for a scene.
pub fn prompt_for(scene: &SceneDescription) -> String {
    match scene.shapes() {
        [first, rest @ ..] if rest.iter().all(|k| k == first) => uniform_prompt(*first),
        [] => "The scene shows objects scattered across the image. Count all the objects in \
               the scene and display the total number."
            .to_string(),
        _ => mixed_prompt(scene.shapes()),
    }
}

fn uniform_prompt(kind: ShapeKind) -> String {
    let desc = shape_description(kind);
    format!(
        "The scene shows {desc} objects scattered across the image. Each object is {} with a \
         black outline. Starting from any position in the image, systematically count all the \
         {desc} objects visible in the scene. Count each object exactly once, ensuring that no \
         object is missed or counted multiple times. After completing the count, display the \
         total number of {desc} objects found in the scene.",
        shape_appearance(kind)
    )
}

fn mixed_prompt(shapes: &[ShapeKind]) -> String {
    let mut kinds = shapes.to_vec();
    kinds.sort_by_key(|k| k.tag());
    kinds.dedup();
    let descs: Vec<&str> = kinds.into_iter().map(shape_description).collect();
    format!(
        "The scene shows objects of different shapes scattered across the image, including {} \
         objects. Each object is a filled geometric shape with a black outline. Starting from \
         any position in the image, systematically count all the objects visible in the scene \
         regardless of their shape. Count each object exactly once, ensuring that no object is \
         missed or counted multiple times. After completing the count, display the total number \
         of objects found in the scene.",
        join_list(&descs)
    )
}

/// "a", "a and b", "a, b, and c".
fn join_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => one.to_string(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}
