//! Attribute parsing for `#[derive(Variables)]`.

use syn::{Attribute, Ident, LitStr};

/// Parsed `#[variables(...)]` attributes on the key enum.
#[derive(Debug, Default)]
pub struct KeyEnumAttrs {
    /// Override name of the generated accessor trait (default: `<Enum>Accessors`)
    pub accessors: Option<Ident>,
}

/// Parsed `#[variables(...)]` attributes on a variant.
#[derive(Debug, Default)]
pub struct VariantAttrs {
    /// Override accessor name (default: snake_case of the variant)
    pub rename: Option<String>,
}

impl KeyEnumAttrs {
    /// Parse attributes from a list of `#[variables(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("variables") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("accessors") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.accessors = Some(value.parse()?);
                } else {
                    return Err(meta.error(format!(
                        "unknown variables attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

impl VariantAttrs {
    /// Parse attributes from a list of `#[variables(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("variables") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    let name = value.value();
                    if syn::parse_str::<Ident>(&name).is_err() {
                        return Err(syn::Error::new(
                            value.span(),
                            format!("`{name}` is not a valid accessor name"),
                        ));
                    }
                    result.rename = Some(name);
                } else {
                    return Err(meta.error(format!(
                        "unknown variables variant attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

/// Convert a CamelCase variant name to snake_case.
///
/// Runs of capitals are kept together (`HTTPPort` becomes `http_port`).
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                Some(_) => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
