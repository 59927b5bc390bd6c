//! The component contract and the macros that declare metas.

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::foundation::core::{Raster, Rgba8};
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::SynthRng;
use crate::layers::Layer;

/// A randomized visual operation.
///
/// `sample` resolves a [`Component::Partial`] into a complete [`Component::Meta`], drawing only the
/// fields the partial leaves empty. `apply_meta` is deterministic: the same meta on the same layers
/// always produces the same pixels and geometry, which is what makes a recorded meta replayable.
pub trait Component: Send + Sync {
    /// Fully resolved parameters.
    type Meta: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + 'static;
    /// Parameters with any subset left to be drawn.
    type Partial: Clone
        + Debug
        + Default
        + From<Self::Meta>
        + Serialize
        + DeserializeOwned
        + Send
        + 'static;

    /// Resolve `partial`, drawing every missing value from `rng`.
    fn sample(&self, rng: &mut SynthRng, partial: Self::Partial) -> SynthResult<Self::Meta>;

    /// Mutate `layers` according to a resolved meta.
    fn apply_meta(&self, layers: &mut [Layer], meta: &Self::Meta) -> SynthResult<()> {
        let _ = (layers, meta);
        Err(SynthError::unsupported(format!(
            "{} has no layer operation",
            short_type_name::<Self>()
        )))
    }

    /// Sample then apply; returns the resolved meta for replay.
    fn apply(
        &self,
        rng: &mut SynthRng,
        layers: &mut [Layer],
        partial: Self::Partial,
    ) -> SynthResult<Self::Meta> {
        let meta = self.sample(rng, partial)?;
        self.apply_meta(layers, &meta)?;
        Ok(meta)
    }

    /// Derive a value from a resolved meta without touching any layer.
    fn data(&self, meta: &Self::Meta) -> SynthResult<ComponentData> {
        let _ = meta;
        Ok(ComponentData::Unsupported)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Values produced by [`Component::data`].
#[derive(Clone, Debug)]
pub enum ComponentData {
    /// The component has no data form.
    Unsupported,
    /// A gated component that did not fire.
    Empty,
    /// One colour.
    Color(Rgba8),
    /// Several colours.
    Colors(Vec<Rgba8>),
    /// Text.
    Text(String),
    /// Pixels.
    Texture(Raster),
    /// One entry per child of a sequence.
    List(Vec<ComponentData>),
}

impl ComponentData {
    /// The colour, if this is [`ComponentData::Color`].
    pub fn as_color(&self) -> Option<Rgba8> {
        match self {
            ComponentData::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// The text, if this is [`ComponentData::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ComponentData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Declare a leaf meta struct together with its all-`Option` partial and the `From` conversion.
macro_rules! component_meta {
    (
        $(#[$attr:meta])*
        pub struct $meta:ident / $partial:ident {
            $(
                $(#[$fattr:meta])*
                pub $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $meta {
            $(
                $(#[$fattr])*
                pub $field: $ty,
            )*
        }

        #[doc = concat!("[`", stringify!($meta), "`] with any subset of fields left to be drawn.")]
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $partial {
            $(
                #[allow(missing_docs)]
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl From<$meta> for $partial {
            #[allow(unused_variables)]
            fn from(meta: $meta) -> Self {
                Self {
                    $( $field: Some(meta.$field), )*
                }
            }
        }
    };
}
pub(crate) use component_meta;

/// Declare a closed union of heterogeneous components with tagged meta and partial enums.
///
/// The partial enum has an extra `Any` variant that samples whichever component the union holds.
macro_rules! component_union {
    (
        $(#[$attr:meta])*
        pub enum $name:ident / $meta:ident / $partial:ident {
            $( $variant:ident($ty:ty) ),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $variant($ty),
            )+
        }

        #[doc = concat!("Resolved meta of a [`", stringify!($name), "`].")]
        #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(tag = "kind", content = "meta", rename_all = "snake_case")]
        pub enum $meta {
            $(
                #[allow(missing_docs)]
                $variant(<$ty as $crate::components::Component>::Meta),
            )+
        }

        #[doc = concat!("Partial meta of a [`", stringify!($name), "`].")]
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(tag = "kind", content = "meta", rename_all = "snake_case")]
        pub enum $partial {
            /// Sample whichever component the union holds.
            #[default]
            Any,
            $(
                #[allow(missing_docs)]
                $variant(<$ty as $crate::components::Component>::Partial),
            )+
        }

        impl From<$meta> for $partial {
            fn from(meta: $meta) -> Self {
                match meta {
                    $( $meta::$variant(m) => $partial::$variant(m.into()), )+
                }
            }
        }

        impl $crate::components::Component for $name {
            type Meta = $meta;
            type Partial = $partial;

            fn sample(
                &self,
                rng: &mut $crate::foundation::random::SynthRng,
                partial: $partial,
            ) -> $crate::foundation::error::SynthResult<$meta> {
                #[allow(unreachable_patterns)]
                match (self, partial) {
                    $(
                        ($name::$variant(c), $partial::$variant(p)) => {
                            Ok($meta::$variant(c.sample(rng, p)?))
                        }
                        ($name::$variant(c), $partial::Any) => {
                            Ok($meta::$variant(c.sample(rng, Default::default())?))
                        }
                    )+
                    (_, p) => Err($crate::foundation::error::SynthError::config(format!(
                        "partial meta {p:?} does not match {}",
                        stringify!($name)
                    ))),
                }
            }

            fn apply_meta(
                &self,
                layers: &mut [$crate::layers::Layer],
                meta: &$meta,
            ) -> $crate::foundation::error::SynthResult<()> {
                #[allow(unreachable_patterns)]
                match (self, meta) {
                    $( ($name::$variant(c), $meta::$variant(m)) => c.apply_meta(layers, m), )+
                    (_, m) => Err($crate::foundation::error::SynthError::config(format!(
                        "meta {m:?} does not match {}",
                        stringify!($name)
                    ))),
                }
            }

            fn data(
                &self,
                meta: &$meta,
            ) -> $crate::foundation::error::SynthResult<$crate::components::ComponentData> {
                #[allow(unreachable_patterns)]
                match (self, meta) {
                    $( ($name::$variant(c), $meta::$variant(m)) => c.data(m), )+
                    (_, m) => Err($crate::foundation::error::SynthError::config(format!(
                        "meta {m:?} does not match {}",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}
pub(crate) use component_union;
