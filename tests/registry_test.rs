//! Registry lookup order, error propagation and concurrent readers.

use std::sync::Arc;
use std::thread;

use bumpalo::Bump;
use value_presenter::core::{
    render, DisplayHint, DisplayText, HostInspector, PresentError, PresentOptions, PresentResult,
    Presenter, PresenterFactory, PresenterRegistry, RenderSource, TagMatcher, TypeCode,
    TypeDescriptor,
};
use value_presenter::presenters::{register_string_layout, StringLayout, JAVA_STRING_TAG};
use value_presenter::snapshot::Snapshot;

const SOURCE: &str = r#"
memory 0x100 = "abc"
value s = struct java_string::owned::JavaString {
    vec: struct Vec { len: int 3  buf: struct RawVec { ptr: struct Unique { pointer: ptr 0x100 } } }
}
value n = int 9
value other = struct SomeOtherType { }
"#;

/// Presenter with fixed text, to see which registration won.
struct Label(&'static str);

impl<'h> Presenter<'h> for Label {
    fn name(&self) -> &str {
        self.0
    }

    fn to_text(&self) -> DisplayText<'h> {
        DisplayText::Text(self.0.to_string())
    }
}

struct LabelFactory(&'static str);

impl<H: HostInspector> PresenterFactory<H> for LabelFactory {
    fn build<'h>(&self, _host: &'h H, _value: H::ValueRef) -> PresentResult<Box<dyn Presenter<'h> + 'h>> {
        Ok(Box::new(Label(self.0)))
    }
}

struct FailingFactory;

impl<H: HostInspector> PresenterFactory<H> for FailingFactory {
    fn build<'h>(&self, _host: &'h H, _value: H::ValueRef) -> PresentResult<Box<dyn Presenter<'h> + 'h>> {
        Err(PresentError::FieldMissing {
            path: "missing".to_string(),
        })
    }
}

fn text_of(result: Option<Box<dyn Presenter<'_> + '_>>) -> String {
    match result.expect("presenter").to_text() {
        DisplayText::Text(text) => text,
        DisplayText::Lazy(_) => panic!("expected owned text"),
    }
}

#[test]
fn test_first_registration_wins() {
    let arena = Bump::new();
    let snap = Snapshot::parse(&arena, SOURCE).unwrap();
    let s = snap.root("s").unwrap();

    let mut registry = PresenterRegistry::new("order");
    registry.register(TagMatcher::struct_tag(JAVA_STRING_TAG), LabelFactory("first"));
    registry.register(TagMatcher::struct_tag(JAVA_STRING_TAG), LabelFactory("second"));
    assert_eq!(registry.len(), 2);

    assert_eq!(text_of(registry.find(&snap, s).unwrap()), "first");
}

#[test]
fn test_later_registration_used_when_earlier_does_not_match() {
    let arena = Bump::new();
    let snap = Snapshot::parse(&arena, SOURCE).unwrap();

    let mut registry = PresenterRegistry::new("ints");
    registry.register(TagMatcher::struct_tag("Nope"), LabelFactory("nope"));
    registry.register(
        |ty: &TypeDescriptor<'_>| ty.code == TypeCode::Int,
        LabelFactory("int"),
    );

    assert_eq!(text_of(registry.find(&snap, snap.root("n").unwrap()).unwrap()), "int");
    assert!(registry.find(&snap, snap.root("s").unwrap()).unwrap().is_none());
}

#[test]
fn test_factory_error_is_returned_not_skipped() {
    let arena = Bump::new();
    let snap = Snapshot::parse(&arena, SOURCE).unwrap();
    let s = snap.root("s").unwrap();

    let mut registry = PresenterRegistry::new("failing");
    registry.register(TagMatcher::struct_tag(JAVA_STRING_TAG), FailingFactory);
    registry.register(TagMatcher::struct_tag(JAVA_STRING_TAG), LabelFactory("never"));

    assert_eq!(
        registry.find(&snap, s).err(),
        Some(PresentError::FieldMissing {
            path: "missing".to_string()
        })
    );

    let rendered = render([&registry], &snap, s, &PresentOptions::default());
    assert_eq!(rendered.source, RenderSource::Fallback);
}

#[test]
fn test_empty_registry_matches_nothing() {
    let arena = Bump::new();
    let snap = Snapshot::parse(&arena, SOURCE).unwrap();
    let registry: PresenterRegistry<Snapshot<'_>> = PresenterRegistry::new("empty");

    assert!(registry.is_empty());
    for (_, value) in snap.roots() {
        assert!(registry.find(&snap, value).unwrap().is_none());
    }
}

#[test]
fn test_render_consults_registries_in_order() {
    let arena = Bump::new();
    let snap = Snapshot::parse(&arena, SOURCE).unwrap();
    let s = snap.root("s").unwrap();

    let mut module = PresenterRegistry::new("module");
    module.register(TagMatcher::struct_tag("SomeOtherType"), LabelFactory("other"));
    let mut program = PresenterRegistry::new("program");
    register_string_layout(&mut program, StringLayout::java_string());

    let options = PresentOptions::default();
    let rendered = render([&module, &program], &snap, s, &options);
    assert_eq!(rendered.text, "\"abc\"");
    assert_eq!(rendered.source, RenderSource::Presenter);

    let other = render([&module, &program], &snap, snap.root("other").unwrap(), &options);
    assert_eq!(other.text, "other");
}

#[test]
fn test_hint_only_applies_when_declared() {
    let arena = Bump::new();
    let snap = Snapshot::parse(&arena, SOURCE).unwrap();

    let mut registry = PresenterRegistry::new("hints");
    registry.register(TagMatcher::struct_tag("SomeOtherType"), LabelFactory("raw \"text\""));
    let result = registry
        .present(&snap, snap.root("other").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(result.hint, None::<DisplayHint>);

    let rendered = render([&registry], &snap, snap.root("other").unwrap(), &PresentOptions::default());
    assert_eq!(rendered.text, "raw \"text\"");
}

#[test]
fn test_concurrent_readers() {
    let arena = Bump::new();
    let snap = Snapshot::parse(&arena, SOURCE).unwrap();

    let mut registry = PresenterRegistry::new("shared");
    register_string_layout(&mut registry, StringLayout::java_string());
    let registry = Arc::new(registry);
    let options = PresentOptions::default();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let snap = &snap;
                scope.spawn(move || {
                    snap.roots()
                        .map(|(_, value)| render([registry.as_ref()], snap, value, &options).text)
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for result in &results {
        assert_eq!(result, &results[0]);
    }
    assert_eq!(results[0][0], "\"abc\"");
}
