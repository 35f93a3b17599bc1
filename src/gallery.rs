//! Shimmer placeholders for gallery images until they load or fail.

pub const CONTAINER_SELECTOR: &str = ".gallery-image-container";
pub const IMAGE_SELECTOR: &str = ".gallery-image";
pub const SKELETON_FADE_MILLIS: u32 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageState {
    Loaded,
    /// Finished without pixels: the `error` event has already fired.
    Failed,
    Pending,
}

/// State of an image at the moment its skeleton is attached.
pub fn image_state(complete: bool, natural_width: u32) -> ImageState {
    match (complete, natural_width) {
        (true, 0) => ImageState::Failed,
        (true, _) => ImageState::Loaded,
        (false, _) => ImageState::Pending,
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::attach_skeletons;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{Element, HtmlImageElement};

    use super::*;
    use crate::controller::PageContext;
    use crate::error::BehaviorError;

    /// Adds a skeleton to every gallery container; returns how many were added.
    pub fn attach_skeletons(ctx: &Rc<PageContext>) -> Result<usize, BehaviorError> {
        let containers = ctx.document.query_selector_all(CONTAINER_SELECTOR)?;
        let mut attached = 0;
        for index in 0..containers.length() {
            let Some(container) = containers
                .get(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            let Some(image) = container
                .query_selector(IMAGE_SELECTOR)?
                .and_then(|image| image.dyn_into::<HtmlImageElement>().ok())
            else {
                continue;
            };
            let skeleton = ctx.document.create_element("div")?;
            skeleton.set_class_name("gallery-skeleton");
            container.append_child(&skeleton)?;

            match image_state(image.complete(), image.natural_width()) {
                ImageState::Loaded => retire(ctx, &skeleton, Some(image)),
                ImageState::Failed => retire(ctx, &skeleton, None),
                ImageState::Pending => watch(ctx, skeleton, image),
            }
            attached += 1;
        }
        Ok(attached)
    }

    fn watch(ctx: &Rc<PageContext>, skeleton: Element, image: HtmlImageElement) {
        let on_load = {
            let (ctx, skeleton, loaded) = (ctx.clone(), skeleton.clone(), image.clone());
            Closure::once_into_js(move || retire(&ctx, &skeleton, Some(loaded)))
        };
        let on_error = {
            let ctx = ctx.clone();
            Closure::once_into_js(move || retire(&ctx, &skeleton, None))
        };
        image.set_onload(Some(on_load.unchecked_ref()));
        image.set_onerror(Some(on_error.unchecked_ref()));
    }

    /// Fades the skeleton out, then removes it; a loaded image is revealed at the same time.
    fn retire(ctx: &Rc<PageContext>, skeleton: &Element, loaded: Option<HtmlImageElement>) {
        let _ = skeleton.class_list().add_1("skeleton-fade-out");
        let skeleton = skeleton.clone();
        ctx.timers.set_timeout(SKELETON_FADE_MILLIS, move || {
            if let Some(image) = loaded {
                let _ = image.class_list().add_1("skeleton-loaded");
            }
            if skeleton.parent_node().is_some() {
                skeleton.remove();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn complete_image_without_pixels_has_failed() {
        assert_eq!(image_state(true, 0), ImageState::Failed);
    }

    #[test]
    fn complete_image_with_pixels_is_loaded() {
        assert_eq!(image_state(true, 640), ImageState::Loaded);
    }

    #[test]
    fn incomplete_image_is_watched() {
        assert_eq!(image_state(false, 0), ImageState::Pending);
        assert_eq!(image_state(false, 640), ImageState::Pending);
    }
}
