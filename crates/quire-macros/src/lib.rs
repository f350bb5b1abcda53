//! Proc-macros for the Quire configuration system.
//!
//! Provides the `Configurable` derive, which generates `apply_override` for
//! `--config KEY=VALUE` handling and `merge_fields` for layering config files.

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Type, parse_macro_input};

/// Attribute configuration for a field.
#[derive(Default)]
struct FieldConfig {
  /// The config key name (defaults to field name).
  key: Option<String>,

  /// Whether this field is a nested `Configurable`.
  nested: bool,

  /// Whether this field is a string map addressed as `key.entry=value`.
  map: bool,

  /// Deprecation info: (version, replacement).
  deprecated: Option<(String, Option<String>)>,

  /// Allow empty values (set to None).
  allow_empty: bool,

  /// Pending replacement value (set before deprecated).
  pending_replacement: Option<String>,
}

impl FieldConfig {
  fn from_attrs(attrs: &[Attribute]) -> Self {
    let mut config = Self::default();

    for attr in attrs {
      if !attr.path().is_ident("config") {
        continue;
      }

      let _ = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("key") {
          let value = meta.value()?;
          let lit: syn::LitStr = value.parse()?;
          config.key = Some(lit.value());
        } else if meta.path.is_ident("deprecated") {
          let value = meta.value()?;
          let lit: syn::LitStr = value.parse()?;
          config.deprecated =
            Some((lit.value(), config.pending_replacement.take()));
        } else if meta.path.is_ident("replacement") {
          let value = meta.value()?;
          let lit: syn::LitStr = value.parse()?;
          config.pending_replacement = Some(lit.value());
        } else if meta.path.is_ident("allow_empty") {
          config.allow_empty = true;
        } else if meta.path.is_ident("nested") {
          config.nested = true;
        } else if meta.path.is_ident("map") {
          config.map = true;
        }
        Ok(())
      });
    }

    config
  }
}

/// Render a type without the whitespace `quote` inserts between tokens, so
/// `Option < PathBuf >` compares as `Option<PathBuf>`.
fn type_name(ty: &Type) -> String {
  ty.to_token_stream().to_string().replace(' ', "")
}

/// Derive macro for configuration structs.
#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as DeriveInput);
  let name = &input.ident;
  let (impl_generics, ty_generics, where_clause) =
    input.generics.split_for_impl();

  let fields = match &input.data {
    Data::Struct(data) => &data.fields,
    _ => {
      return syn::Error::new_spanned(
        input,
        "Configurable can only be derived for structs",
      )
      .to_compile_error()
      .into();
    },
  };

  let field_handlers = generate_field_handlers(fields);
  let merge_handlers = generate_merge_handlers(fields);

  let expanded = quote! {
    impl #impl_generics #name #ty_generics #where_clause {
      /// Apply a configuration override by key.
      ///
      /// # Errors
      ///
      /// Returns an error if the key is unknown or the value cannot be parsed
      /// as the field's type.
      pub fn apply_override(
        &mut self,
        key: &str,
        value: &str,
      ) -> std::result::Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        #(#field_handlers)*

        Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for supported keys.",
        )))
      }

      /// Merge another config into this one.
      pub fn merge_fields(&mut self, other: Self) {
        #(#merge_handlers)*
      }
    }
  };

  TokenStream::from(expanded)
}

fn generate_field_handlers(fields: &Fields) -> Vec<proc_macro2::TokenStream> {
  let mut handlers = Vec::new();

  for field in fields {
    // Fields without a config attribute cannot be overridden
    let has_config_attr = field
      .attrs
      .iter()
      .any(|attr| attr.path().is_ident("config"));
    if !has_config_attr {
      continue;
    }

    let field_config = FieldConfig::from_attrs(&field.attrs);
    let field_name = field.ident.as_ref().expect("Named field required");
    let field_key = field_config
      .key
      .clone()
      .unwrap_or_else(|| field_name.to_string());

    handlers.push(generate_field_handler(
      field_name,
      &field_key,
      &field.ty,
      &field_config,
    ));
  }

  handlers
}

fn generate_field_handler(
  field_name: &syn::Ident,
  field_key: &str,
  field_type: &Type,
  config: &FieldConfig,
) -> proc_macro2::TokenStream {
  if config.nested {
    return generate_nested_handler(field_name, field_key);
  }

  if config.map {
    return generate_map_handler(field_name, field_key);
  }

  // Collections without a `map` attribute can't be set from a single value
  let type_str = type_name(field_type);
  if type_str.starts_with("Vec<") || type_str.contains("Map<") {
    return quote! {};
  }

  let deprecation_check =
    if let Some((version, replacement)) = &config.deprecated {
      let msg = replacement.as_ref().map_or_else(
        || {
          format!("The '{field_key}' config key is deprecated since {version}.")
        },
        |replacement| {
          format!(
            "The '{field_key}' config key is deprecated since {version}. Use \
             '{replacement}' instead."
          )
        },
      );
      quote! {
        log::warn!(#msg);
      }
    } else {
      quote! {}
    };

  let value_assignment =
    generate_value_assignment(field_name, &type_str, config);

  let assignment_expr = if config.deprecated.is_some() {
    quote! {
      #[allow(deprecated)]
      { #value_assignment }
    }
  } else {
    value_assignment
  };

  quote! {
    if key == #field_key {
      #deprecation_check
      #assignment_expr
      return Ok(());
    }
  }
}

fn generate_nested_handler(
  field_name: &syn::Ident,
  base_key: &str,
) -> proc_macro2::TokenStream {
  // Sub-keys look like "search.language"
  quote! {
    if let Some(subkey) = key.strip_prefix(concat!(#base_key, ".")) {
      return self
        .#field_name
        .get_or_insert_with(Default::default)
        .apply_override(subkey, value);
    }
  }
}

fn generate_map_handler(
  field_name: &syn::Ident,
  base_key: &str,
) -> proc_macro2::TokenStream {
  // Map entries look like "replacements.{version_num}=v1.0". An empty value
  // removes the entry.
  quote! {
    if let Some(entry) = key.strip_prefix(concat!(#base_key, ".")) {
      if entry.is_empty() {
        return Err(ConfigError::Config(format!(
          "Missing entry name in '{key}'. Expected {}.NAME=VALUE",
          #base_key
        )));
      }
      if value.is_empty() {
        self.#field_name.shift_remove(entry);
      } else {
        self.#field_name.insert(entry.to_string(), value.to_string());
      }
      return Ok(());
    }
  }
}

fn generate_value_assignment(
  field_name: &syn::Ident,
  type_str: &str,
  config: &FieldConfig,
) -> proc_macro2::TokenStream {
  let expected = match type_str {
    "usize" | "Option<usize>" => ". Expected a positive integer",
    "u8" | "Option<u8>" => ". Expected a number between 0-255",
    "f32" | "Option<f32>" => ". Expected a number",
    _ => "",
  };

  if type_str.starts_with("Option<") {
    if config.allow_empty {
      quote! {
        self.#field_name = if value.is_empty() {
          None
        } else {
          Some(value.parse().map_err(|_| ConfigError::Config(format!(
            "Invalid value for '{}': '{}'{}", stringify!(#field_name), value, #expected
          )))?)
        };
      }
    } else {
      quote! {
        self.#field_name = Some(value.parse().map_err(|_| ConfigError::Config(format!(
          "Invalid value for '{}': '{}'{}", stringify!(#field_name), value, #expected
        )))?);
      }
    }
  } else if type_str == "PathBuf" || type_str.ends_with("::PathBuf") {
    quote! {
      self.#field_name = std::path::PathBuf::from(value);
    }
  } else if type_str == "String" {
    quote! {
      self.#field_name = value.to_string();
    }
  } else if type_str == "bool" {
    quote! {
      self.#field_name = match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => true,
        "false" | "no" | "0" => false,
        _ => {
          return Err(ConfigError::Config(format!(
            "Invalid boolean value for '{}': '{}'. Expected true/false, yes/no, or 1/0",
            stringify!(#field_name), value
          )));
        }
      };
    }
  } else {
    quote! {
      self.#field_name = value.parse().map_err(|_| ConfigError::Config(format!(
        "Invalid value for '{}': '{}'{}", stringify!(#field_name), value, #expected
      )))?;
    }
  }
}

fn generate_merge_handlers(fields: &Fields) -> Vec<proc_macro2::TokenStream> {
  let mut handlers = Vec::new();

  for field in fields {
    let field_config = FieldConfig::from_attrs(&field.attrs);
    let field_name = field.ident.as_ref().expect("Named field required");
    let type_str = type_name(&field.ty);

    let handler = if field_config.nested || type_str.starts_with("Option<") {
      // Replace if other has Some
      quote! {
        if other.#field_name.is_some() {
          self.#field_name = other.#field_name;
        }
      }
    } else if type_str.starts_with("Vec<") || type_str.contains("Map<") {
      // Collections: extend, other takes precedence on map keys
      quote! {
        self.#field_name.extend(other.#field_name);
      }
    } else {
      // Plain fields: always replace
      quote! {
        self.#field_name = other.#field_name;
      }
    };

    handlers.push(handler);
  }

  handlers
}
