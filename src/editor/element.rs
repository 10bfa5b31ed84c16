use super::ViewError;
use crate::config::EnvConfig;
use crate::models::ImageAttributes;
use crate::util::px;
use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlImageElement};

pub(crate) const CONTAINER_CLASS: &str = "image-node-view";
pub(crate) const PLACEHOLDER_CLASS: &str = "image-node-placeholder";

/// DOM for one image node: container, `<img>` and the error placeholder.
pub(crate) struct ImageElement {
    pub container: HtmlElement,
    pub img: HtmlImageElement,
    pub placeholder: HtmlElement,
    placeholder_alt: HtmlElement,
    _on_load: EventListener,
    _on_error: EventListener,
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, ViewError> {
    document
        .create_element(tag)
        .map(|el| el.unchecked_into::<T>())
        .map_err(|e| ViewError::dom(tag, e))
}

pub(crate) fn set_shown(el: &HtmlElement, shown: bool) {
    let style = el.style();
    let _ = if shown {
        style.remove_property("display").map(|_| ())
    } else {
        style.set_property("display", "none")
    };
}

fn show_loaded(container: &HtmlElement, img: &HtmlElement, placeholder: &HtmlElement) {
    set_shown(img, true);
    set_shown(placeholder, false);
    let _ = container.remove_attribute("data-error");
}

fn show_failed(container: &HtmlElement, img: &HtmlElement, placeholder: &HtmlElement) {
    set_shown(img, false);
    set_shown(placeholder, true);
    let _ = container.set_attribute("data-error", "true");
}

impl ImageElement {
    pub(crate) fn build(
        document: &Document,
        attrs: &ImageAttributes,
        config: &EnvConfig,
    ) -> Result<Self, ViewError> {
        let container: HtmlElement = create(document, "div")?;
        container.set_class_name(CONTAINER_CLASS);

        let img: HtmlImageElement = create(document, "img")?;
        img.set_draggable(false);

        let placeholder: HtmlElement = create(document, "div")?;
        placeholder.set_class_name(PLACEHOLDER_CLASS);
        let label: HtmlElement = create(document, "span")?;
        label.set_text_content(Some(&config.placeholder_label));
        let placeholder_alt: HtmlElement = create(document, "span")?;
        placeholder_alt.set_class_name("image-node-placeholder-alt");
        placeholder
            .append_child(&label)
            .and_then(|_| placeholder.append_child(&placeholder_alt))
            .map_err(|e| ViewError::dom("placeholder", e))?;
        set_shown(&placeholder, false);

        container
            .append_child(&img)
            .and_then(|_| container.append_child(&placeholder))
            .map_err(|e| ViewError::dom("container", e))?;

        let _on_load = {
            let (container, img_el, placeholder) =
                (container.clone(), img.clone().unchecked_into::<HtmlElement>(), placeholder.clone());
            EventListener::new(&img, "load", move |_| {
                show_loaded(&container, &img_el, &placeholder);
            })
        };

        let _on_error = {
            let (container, img_el, placeholder) =
                (container.clone(), img.clone(), placeholder.clone());
            EventListener::new(&img, "error", move |_| {
                show_failed(&container, img_el.unchecked_ref(), &placeholder);
                tracing::warn!(src = %img_el.src(), "image failed to load");
            })
        };

        let el = Self {
            container,
            img,
            placeholder,
            placeholder_alt,
            _on_load,
            _on_error,
        };

        el.apply_meta(attrs);
        // src last, so the listeners above see the first load/error.
        el.img.set_src(&attrs.src);

        Ok(el)
    }

    /// Applies `next` in place. A changed `src` resets the error state and
    /// re-attempts the load.
    pub(crate) fn patch(&self, prev: &ImageAttributes, next: &ImageAttributes) {
        self.apply_meta(next);

        if prev.src != next.src {
            show_loaded(&self.container, self.img.unchecked_ref(), &self.placeholder);
            self.img.set_src(&next.src);
        }
    }

    fn apply_meta(&self, attrs: &ImageAttributes) {
        let _ = self.container.set_attribute("data-align", attrs.align.as_ref());

        self.img.set_alt(&attrs.alt);
        if attrs.title.is_empty() {
            let _ = self.img.remove_attribute("title");
        } else {
            self.img.set_title(&attrs.title);
        }
        self.placeholder_alt
            .set_text_content((!attrs.alt.is_empty()).then_some(attrs.alt.as_str()));

        self.set_width(attrs.width);
    }

    pub(crate) fn set_width(&self, width: Option<u32>) {
        let style = self.img.style();
        let _ = match width {
            Some(w) => style.set_property("width", &px(w)),
            None => style.remove_property("width").map(|_| ()),
        };
    }

    pub(crate) fn has_error(&self) -> bool {
        self.container.get_attribute("data-error").as_deref() == Some("true")
    }
}
