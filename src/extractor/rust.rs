use super::{Introspector, ModuleInfo, SourceObject};
use crate::parser::ParsedFile;
use crate::signature::{CallSignature, DefaultValue, Parameter, ParameterKind, TypeExpr};
use log::debug;
use quote::ToTokens;
use syn::{
    Attribute, Expr, ExprLit, Fields, FnArg, ImplItem, Item, Lit, Meta, Pat, ReturnType, TraitItem, Type,
    TypeParamBound,
};

/// Name of the attribute that opts an item into documentation.
pub const MARKER_ATTRIBUTE: &str = "document_me";

/// Introspector for Rust source files.
///
/// Items carrying `#[document_me]` (or any path ending in `document_me`) are reported. Functions
/// in `impl` blocks and trait bodies become methods of the implementing type or trait; structs,
/// enums and traits become classes.
pub struct RustIntrospector {
    marker: String,
}

impl Default for RustIntrospector {
    fn default() -> Self {
        Self::with_marker(MARKER_ATTRIBUTE)
    }
}

impl Introspector for RustIntrospector {
    fn introspect(&self, parsed_file: &ParsedFile) -> Vec<SourceObject> {
        let module = ModuleInfo::new(
            parsed_file.module_name.clone(),
            docstring(&parsed_file.syntax_tree.attrs),
        );
        let mut objects = Vec::new();
        self.walk_items(&parsed_file.syntax_tree.items, &module, &mut objects);
        debug!(
            "Found {} marked objects in {}",
            objects.len(),
            parsed_file.path.display()
        );
        objects
    }
}

impl RustIntrospector {
    /// Creates an introspector looking for a custom marker attribute.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    fn is_marked(&self, attrs: &[Attribute]) -> bool {
        attrs.iter().any(|attr| {
            attr.path()
                .segments
                .last()
                .is_some_and(|segment| segment.ident == self.marker)
        })
    }

    fn walk_items(&self, items: &[Item], module: &ModuleInfo, out: &mut Vec<SourceObject>) {
        for item in items {
            match item {
                Item::Fn(item_fn) => {
                    if self.is_marked(&item_fn.attrs) {
                        let qualname = item_fn.sig.ident.to_string();
                        out.push(
                            SourceObject::function(module.clone(), &qualname, fn_signature(&item_fn.sig))
                                .docstring_from(&item_fn.attrs),
                        );
                    }
                }
                Item::Struct(item_struct) => {
                    if self.is_marked(&item_struct.attrs) {
                        let qualname = item_struct.ident.to_string();
                        out.push(
                            SourceObject::class(
                                module.clone(),
                                &qualname,
                                fields_signature(&item_struct.fields),
                                Vec::new(),
                            )
                            .docstring_from(&item_struct.attrs),
                        );
                    }
                }
                Item::Enum(item_enum) => {
                    if self.is_marked(&item_enum.attrs) {
                        let qualname = item_enum.ident.to_string();
                        out.push(
                            SourceObject::class(module.clone(), &qualname, CallSignature::default(), Vec::new())
                                .docstring_from(&item_enum.attrs),
                        );
                    }
                }
                Item::Trait(item_trait) => {
                    let owner = item_trait.ident.to_string();
                    // Methods first: the trait itself only exists once its body is complete.
                    for trait_item in &item_trait.items {
                        if let TraitItem::Fn(method) = trait_item {
                            if self.is_marked(&method.attrs) {
                                out.push(method_object(module, &owner, &method.sig, &method.attrs));
                            }
                        }
                    }
                    if self.is_marked(&item_trait.attrs) {
                        let bases = item_trait
                            .supertraits
                            .iter()
                            .filter_map(|bound| match bound {
                                TypeParamBound::Trait(trait_bound) => Some(tidy(&trait_bound.path)),
                                _ => None,
                            })
                            .collect();
                        out.push(
                            SourceObject::class(module.clone(), &owner, CallSignature::default(), bases)
                                .docstring_from(&item_trait.attrs),
                        );
                    }
                }
                Item::Impl(item_impl) => {
                    let Some(owner) = owner_name(&item_impl.self_ty) else {
                        debug!("Skipping impl block for {}", tidy(&item_impl.self_ty));
                        continue;
                    };
                    for impl_item in &item_impl.items {
                        if let ImplItem::Fn(method) = impl_item {
                            if self.is_marked(&method.attrs) {
                                out.push(method_object(module, &owner, &method.sig, &method.attrs));
                            }
                        }
                    }
                }
                Item::Mod(item_mod) => {
                    if self.is_marked(&item_mod.attrs) {
                        out.push(SourceObject::value(module.clone(), &item_mod.ident.to_string()));
                    }
                    if let Some((_, items)) = &item_mod.content {
                        let child = ModuleInfo::new(
                            format!("{}::{}", module.name, item_mod.ident),
                            docstring(&item_mod.attrs),
                        );
                        self.walk_items(items, &child, out);
                    }
                }
                other => {
                    if let Some((name, attrs)) = value_item(other) {
                        if self.is_marked(attrs) {
                            out.push(SourceObject::value(module.clone(), &name).docstring_from(attrs));
                        }
                    }
                }
            }
        }
    }
}

impl SourceObject {
    fn docstring_from(mut self, attrs: &[Attribute]) -> Self {
        self.docstring = docstring(attrs);
        self
    }
}

fn method_object(module: &ModuleInfo, owner: &str, sig: &syn::Signature, attrs: &[Attribute]) -> SourceObject {
    let qualname = format!("{}.{}", owner, sig.ident);
    SourceObject::function(module.clone(), &qualname, fn_signature(sig)).docstring_from(attrs)
}

/// Name and attributes of items that can be marked but not called.
fn value_item(item: &Item) -> Option<(String, &[Attribute])> {
    match item {
        Item::Const(i) => Some((i.ident.to_string(), &i.attrs)),
        Item::Static(i) => Some((i.ident.to_string(), &i.attrs)),
        Item::Type(i) => Some((i.ident.to_string(), &i.attrs)),
        Item::Union(i) => Some((i.ident.to_string(), &i.attrs)),
        Item::TraitAlias(i) => Some((i.ident.to_string(), &i.attrs)),
        Item::ExternCrate(i) => Some((i.ident.to_string(), &i.attrs)),
        Item::Use(i) => Some((tidy(&i.tree), &i.attrs)),
        Item::Macro(i) => Some((
            i.ident
                .as_ref()
                .map_or_else(|| tidy(&i.mac.path), |ident| ident.to_string()),
            &i.attrs,
        )),
        _ => None,
    }
}

/// Joins `#[doc]` attributes (`///`, `//!`) into one dedented text.
pub fn docstring(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text), ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .collect();

    if lines.is_empty() {
        return None;
    }

    let text = dedent(&lines.join("\n"));
    let text = text.trim_matches('\n').trim_end();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Removes the common run of leading spaces and tabs. Other whitespace is content.
fn dedent(text: &str) -> String {
    let indent_of = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(indent_of)
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| &line[indent_of(line).min(indent)..])
        .collect::<Vec<_>>()
        .join("\n")
}

fn fn_signature(sig: &syn::Signature) -> CallSignature {
    let mut parameters = Vec::new();
    let mut pieces = Vec::new();

    for input in &sig.inputs {
        match input {
            FnArg::Receiver(receiver) => pieces.push(tidy(receiver)),
            FnArg::Typed(typed) => {
                let name = pattern_name(&typed.pat);
                pieces.push(format!("{}: {}", name, tidy(&typed.ty)));
                parameters.push(Parameter::new(
                    name,
                    ParameterKind::PositionalOnly,
                    Some(type_expr(&typed.ty)),
                ));
            }
        }
    }

    if let Some(variadic) = &sig.variadic {
        let name = variadic
            .pat
            .as_ref()
            .map_or_else(|| "...".to_string(), |(pat, _)| pattern_name(pat));
        pieces.push(if name == "..." { name.clone() } else { format!("{}: ...", name) });
        parameters.push(Parameter::new(name, ParameterKind::VarPositional, None));
    }

    let (return_annotation, return_text) = match &sig.output {
        ReturnType::Default => (None, String::new()),
        ReturnType::Type(_, ty) => (Some(type_expr(ty)), format!(" -> {}", tidy(ty))),
    };

    CallSignature {
        parameters,
        return_annotation,
        text: format!("({}){}", pieces.join(", "), return_text),
    }
}

/// Constructor shape of a struct: named fields are keyword arguments, tuple fields positional.
fn fields_signature(fields: &Fields) -> CallSignature {
    match fields {
        Fields::Named(named) => {
            let mut parameters = Vec::new();
            let mut pieces = Vec::new();
            for field in &named.named {
                let Some(ident) = &field.ident else { continue };
                let name = ident.to_string();
                pieces.push(format!("{}: {}", name, tidy(&field.ty)));
                parameters.push(
                    Parameter::new(name, ParameterKind::KeywordOnly, Some(type_expr(&field.ty)))
                        .with_default(field_default(field)),
                );
            }
            CallSignature {
                parameters,
                return_annotation: None,
                text: format!(" {{ {} }}", pieces.join(", ")),
            }
        }
        Fields::Unnamed(unnamed) => {
            let mut parameters = Vec::new();
            let mut pieces = Vec::new();
            for (index, field) in unnamed.unnamed.iter().enumerate() {
                pieces.push(tidy(&field.ty));
                parameters.push(
                    Parameter::new(index.to_string(), ParameterKind::PositionalOnly, Some(type_expr(&field.ty)))
                        .with_default(field_default(field)),
                );
            }
            CallSignature {
                parameters,
                return_annotation: None,
                text: format!("({})", pieces.join(", ")),
            }
        }
        Fields::Unit => CallSignature::default(),
    }
}

/// Default of a struct field: `#[serde(default)]`, `#[serde(default = "path")]` or `Option<T>`.
fn field_default(field: &syn::Field) -> DefaultValue {
    for attr in &field.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let Ok(meta_list) = attr.meta.require_list() else { continue };
        let tokens_str = meta_list.tokens.to_string();
        for piece in tokens_str.split(',').map(str::trim) {
            if piece == "default" {
                return DefaultValue::Value("Default::default()".to_string());
            }
            if let Some(rest) = piece.strip_prefix("default") {
                if let Some(value) = rest.trim_start().strip_prefix('=') {
                    let path = value.trim().trim_matches('"');
                    return DefaultValue::Value(format!("{}()", path));
                }
            }
        }
    }

    match type_expr(&field.ty) {
        TypeExpr::Named { name, .. } if name == "Option" => DefaultValue::Absent,
        _ => DefaultValue::Required,
    }
}

/// Converts a syntactic type into the host-neutral type expression.
pub fn type_expr(ty: &Type) -> TypeExpr {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => {
            let Some(segment) = type_path.path.segments.last() else {
                return TypeExpr::Opaque(tidy(ty));
            };
            match &segment.arguments {
                syn::PathArguments::None => TypeExpr::named(segment.ident.to_string()),
                syn::PathArguments::AngleBracketed(args) => {
                    let inner = args
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            syn::GenericArgument::Type(inner_ty) => Some(type_expr(inner_ty)),
                            _ => None,
                        })
                        .collect();
                    TypeExpr::generic(segment.ident.to_string(), inner)
                }
                syn::PathArguments::Parenthesized(_) => TypeExpr::Opaque(tidy(ty)),
            }
        }
        Type::Reference(reference) => TypeExpr::Reference {
            mutable: reference.mutability.is_some(),
            inner: Box::new(type_expr(&reference.elem)),
        },
        Type::Slice(slice) => TypeExpr::Slice(Box::new(type_expr(&slice.elem))),
        Type::Array(array) => TypeExpr::Array {
            elem: Box::new(type_expr(&array.elem)),
            len: tidy(&array.len),
        },
        Type::Tuple(tuple) if tuple.elems.is_empty() => TypeExpr::Empty,
        Type::Tuple(tuple) => TypeExpr::Tuple(tuple.elems.iter().map(type_expr).collect()),
        Type::Paren(paren) => type_expr(&paren.elem),
        Type::Group(group) => type_expr(&group.elem),
        other => TypeExpr::Opaque(tidy(other)),
    }
}

fn owner_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.to_string()),
        Type::Reference(reference) => owner_name(&reference.elem),
        Type::Paren(paren) => owner_name(&paren.elem),
        Type::Group(group) => owner_name(&group.elem),
        _ => None,
    }
}

fn pattern_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
        Pat::Wild(_) => "_".to_string(),
        other => tidy(other),
    }
}

/// Renders tokens as source text with the spacing a human would write.
fn tidy<T: ToTokens>(node: &T) -> String {
    let mut text = node.to_token_stream().to_string();
    for (from, to) in [
        (" :: ", "::"),
        (":: ", "::"),
        (" < ", "<"),
        ("< ", "<"),
        (" <", "<"),
        (" >", ">"),
        (" ,", ","),
        (" ;", ";"),
        ("& ", "&"),
        ("( ", "("),
        (" )", ")"),
        ("[ ", "["),
        (" ]", "]"),
    ] {
        while text.contains(from) {
            text = text.replace(from, to);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ObjectShape;
    use crate::signature::SignatureNormalizer;
    use pretty_assertions::assert_eq;

    fn introspect(module: &str, source: &str) -> Vec<SourceObject> {
        let parsed = ParsedFile::from_source(module, source).unwrap();
        RustIntrospector::default().introspect(&parsed)
    }

    fn qualnames(objects: &[SourceObject]) -> Vec<&str> {
        objects.iter().map(|o| o.qualname.as_str()).collect()
    }

    fn signature(object: &SourceObject) -> &CallSignature {
        match &object.shape {
            ObjectShape::Function(signature) => signature,
            ObjectShape::Class { signature, .. } => signature,
            ObjectShape::Value => panic!("{} has no signature", object.qualname),
        }
    }

    #[test]
    fn test_only_marked_items_are_reported() {
        let objects = introspect(
            "math",
            r#"
            //! Basic arithmetic.

            /// Add two numbers.
            #[document_me]
            pub fn add(a: f64, b: f64) -> f64 { a + b }

            pub fn subtract(a: f64, b: f64) -> f64 { a - b }

            #[docurator::document_me]
            pub fn multiply(a: f64, b: f64) -> f64 { a * b }
            "#,
        );

        assert_eq!(qualnames(&objects), vec!["add", "multiply"]);
        assert_eq!(objects[0].module.name, "math");
        assert_eq!(objects[0].module.docstring.as_deref(), Some("Basic arithmetic."));
        assert_eq!(objects[0].docstring.as_deref(), Some("Add two numbers."));
        assert_eq!(objects[1].docstring, None);
    }

    #[test]
    fn test_impl_before_struct_keeps_source_order() {
        let objects = introspect(
            "cache",
            r#"
            impl Cache {
                #[document_me]
                pub fn add(&mut self, key: String, value: u64) {}

                pub fn helper(&self) {}
            }

            /// A small cache.
            #[document_me]
            pub struct Cache {
                entries: Vec<u64>,
            }

            impl Cache {
                #[document_me]
                pub fn clear(&mut self) {}
            }
            "#,
        );

        assert_eq!(qualnames(&objects), vec!["Cache.add", "Cache", "Cache.clear"]);
        assert_eq!(objects[0].name, "add");
        assert!(objects[1].is_class());
    }

    #[test]
    fn test_trait_methods_precede_trait() {
        let objects = introspect(
            "shapes",
            r#"
            #[document_me]
            pub trait Shape: std::fmt::Debug + Sized {
                #[document_me]
                fn area(&self) -> f64;
                fn name(&self) -> String;
            }
            "#,
        );

        assert_eq!(qualnames(&objects), vec!["Shape.area", "Shape"]);
        match &objects[1].shape {
            ObjectShape::Class { bases, .. } => {
                assert_eq!(bases, &vec!["std::fmt::Debug".to_string(), "Sized".to_string()])
            }
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_receiver_is_not_a_parameter() {
        let objects = introspect(
            "cache",
            r#"
            impl<'a> Cache<'a> {
                #[document_me]
                pub fn retrieve(&self, key: &str) -> Option<&'a u64> { None }
            }
            "#,
        );

        let sig = signature(&objects[0]);
        assert_eq!(objects[0].qualname, "Cache.retrieve");
        assert_eq!(sig.parameters.len(), 1);
        assert_eq!(sig.parameters[0].name, "key");
        assert_eq!(sig.text, "(&self, key: &str) -> Option<&'a u64>");
        assert_eq!(
            SignatureNormalizer::return_annotation(sig),
            Some("Option[&u64]".to_string())
        );
    }

    #[test]
    fn test_struct_fields_become_keyword_parameters() {
        let objects = introspect(
            "config",
            r#"
            #[document_me]
            pub struct Settings {
                pub name: String,
                pub limit: Option<u32>,
                #[serde(default)]
                pub retries: u8,
                #[serde(rename = "ttl", default = "default_ttl")]
                pub ttl: std::collections::HashMap<String, Vec<u64>>,
            }

            #[document_me]
            pub struct Pair(pub u32, pub String);
            "#,
        );

        let args = SignatureNormalizer::normalize(signature(&objects[0]));
        assert_eq!(args.len(), 4);
        assert_eq!(args[0].kind, "Keyword only");
        assert_eq!(args[0].default, None);
        assert_eq!(args[1].annotation.as_deref(), Some("Option[u32]"));
        assert_eq!(args[1].default.as_deref(), Some("optional"));
        assert_eq!(args[2].default.as_deref(), Some("optional: default = Default::default()"));
        assert_eq!(args[3].annotation.as_deref(), Some("HashMap[String, Vec[u64]]"));
        assert_eq!(args[3].default.as_deref(), Some("optional: default = default_ttl()"));

        let pair = signature(&objects[1]);
        assert_eq!(pair.text, "(u32, String)");
        let names: Vec<&str> = pair.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["0", "1"]);
    }

    #[test]
    fn test_inline_module_gets_own_name() {
        let objects = introspect(
            "crate",
            r#"
            pub mod inner {
                //! Inner helpers.

                #[document_me]
                pub fn helper() {}
            }
            "#,
        );

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].module.name, "crate::inner");
        assert_eq!(objects[0].module.docstring.as_deref(), Some("Inner helpers."));
    }

    #[test]
    fn test_marked_constant_is_not_callable() {
        let objects = introspect(
            "limits",
            r#"
            #[document_me]
            pub const MAX: usize = 10;
            "#,
        );

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "MAX");
        assert!(!objects[0].is_callable());
    }

    #[test]
    fn test_docstring_keeps_relative_indentation() {
        let objects = introspect(
            "math",
            r#"
            /// Divide numbers.
            ///
            /// Args:
            ///     a (f64): The dividend.
            ///     b (f64): The divisor.
            #[document_me]
            pub fn divide(a: f64, b: f64) -> f64 { a / b }
            "#,
        );

        assert_eq!(
            objects[0].docstring.as_deref(),
            Some("Divide numbers.\n\nArgs:\n    a (f64): The dividend.\n    b (f64): The divisor.")
        );
    }

    #[test]
    fn test_docstring_with_non_ascii_whitespace() {
        let objects = introspect("text", "///  Title.\n/// \u{a0}more text\n#[document_me]\npub fn f() {}");

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].docstring.as_deref(), Some(" Title.\n\u{a0}more text"));
    }

    #[test]
    fn test_type_expr_shapes() {
        let ty: Type = syn::parse_str("[u8; 4]").unwrap();
        assert_eq!(SignatureNormalizer::annotation(&type_expr(&ty)).as_deref(), Some("[u8; 4]"));

        let ty: Type = syn::parse_str("(u32, String)").unwrap();
        assert_eq!(SignatureNormalizer::annotation(&type_expr(&ty)).as_deref(), Some("(u32, String)"));

        let ty: Type = syn::parse_str("()").unwrap();
        assert_eq!(SignatureNormalizer::annotation(&type_expr(&ty)), None);

        let ty: Type = syn::parse_str("&mut [String]").unwrap();
        assert_eq!(SignatureNormalizer::annotation(&type_expr(&ty)).as_deref(), Some("&mut [String]"));
    }
}
