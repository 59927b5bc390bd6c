//! Combinators: probabilistic gate, weighted choice, and fixed sequence.

use crate::components::component::{Component, ComponentData};
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{Categorical, SynthRng, chance};
use crate::layers::Layer;

/// Resolved meta of a [`Switch`]: `meta` is present exactly when `state` is on.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SwitchMeta<M> {
    /// Whether the wrapped component fired.
    pub state: bool,
    /// The wrapped component's meta when it fired.
    pub meta: Option<M>,
}

/// Partial meta of a [`Switch`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(bound(
    serialize = "P: serde::Serialize",
    deserialize = "P: serde::de::DeserializeOwned"
))]
pub struct SwitchPartial<P> {
    /// Forced state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,
    /// Partial meta for the wrapped component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<P>,
}

impl<P> Default for SwitchPartial<P> {
    fn default() -> Self {
        Self {
            state: None,
            meta: None,
        }
    }
}

impl<M, P: From<M>> From<SwitchMeta<M>> for SwitchPartial<P> {
    fn from(meta: SwitchMeta<M>) -> Self {
        Self {
            state: Some(meta.state),
            meta: meta.meta.map(P::from),
        }
    }
}

/// Fires the wrapped component with probability `prob`.
#[derive(Clone, Debug)]
pub struct Switch<C> {
    component: C,
    prob: f64,
}

impl<C: Component> Switch<C> {
    /// Wrap `component`; `prob` must lie in `[0, 1]`.
    pub fn new(component: C, prob: f64) -> SynthResult<Self> {
        if !(0.0..=1.0).contains(&prob) {
            return Err(SynthError::config(format!(
                "switch probability {prob} outside [0, 1]"
            )));
        }
        Ok(Self { component, prob })
    }

    /// The wrapped component.
    pub fn component(&self) -> &C {
        &self.component
    }

    fn child_meta<'m>(&self, meta: &'m SwitchMeta<C::Meta>) -> SynthResult<Option<&'m C::Meta>> {
        match (meta.state, &meta.meta) {
            (false, _) => Ok(None),
            (true, Some(m)) => Ok(Some(m)),
            (true, None) => Err(SynthError::config("switch meta is on but carries no child meta")),
        }
    }
}

impl<C: Component> Component for Switch<C> {
    type Meta = SwitchMeta<C::Meta>;
    type Partial = SwitchPartial<C::Partial>;

    fn sample(&self, rng: &mut SynthRng, partial: Self::Partial) -> SynthResult<Self::Meta> {
        let state = match partial.state {
            Some(s) => s,
            None => chance(rng, self.prob),
        };
        let meta = if state {
            Some(self.component.sample(rng, partial.meta.unwrap_or_default())?)
        } else {
            None
        };
        Ok(SwitchMeta { state, meta })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &Self::Meta) -> SynthResult<()> {
        match self.child_meta(meta)? {
            Some(m) => self.component.apply_meta(layers, m),
            None => Ok(()),
        }
    }

    fn data(&self, meta: &Self::Meta) -> SynthResult<ComponentData> {
        match self.child_meta(meta)? {
            Some(m) => self.component.data(m),
            None => Ok(ComponentData::Empty),
        }
    }
}

/// Resolved meta of a [`Selector`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SelectorMeta<M> {
    /// Index of the chosen component.
    pub idx: usize,
    /// The chosen component's meta.
    pub meta: M,
}

/// Partial meta of a [`Selector`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(bound(
    serialize = "P: serde::Serialize",
    deserialize = "P: serde::de::DeserializeOwned"
))]
pub struct SelectorPartial<P> {
    /// Forced choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idx: Option<usize>,
    /// Partial meta for the chosen component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<P>,
}

impl<P> Default for SelectorPartial<P> {
    fn default() -> Self {
        Self {
            idx: None,
            meta: None,
        }
    }
}

impl<M, P: From<M>> From<SelectorMeta<M>> for SelectorPartial<P> {
    fn from(meta: SelectorMeta<M>) -> Self {
        Self {
            idx: Some(meta.idx),
            meta: Some(P::from(meta.meta)),
        }
    }
}

/// Picks one of several components by weight.
#[derive(Clone, Debug)]
pub struct Selector<C> {
    components: Vec<C>,
    choice: Categorical,
}

impl<C: Component> Selector<C> {
    /// Choose among `components`, uniformly unless `weights` is given.
    pub fn new(components: Vec<C>, weights: Option<&[f64]>) -> SynthResult<Self> {
        let choice = Categorical::new(components.len(), weights)?;
        Ok(Self { components, choice })
    }

    /// The alternatives.
    pub fn components(&self) -> &[C] {
        &self.components
    }

    /// Normalized weights.
    pub fn weights(&self) -> &[f64] {
        self.choice.weights()
    }

    fn child(&self, idx: usize) -> SynthResult<&C> {
        self.components.get(idx).ok_or_else(|| {
            SynthError::config(format!(
                "selector index {idx} out of range for {} components",
                self.components.len()
            ))
        })
    }
}

impl<C: Component> Component for Selector<C> {
    type Meta = SelectorMeta<C::Meta>;
    type Partial = SelectorPartial<C::Partial>;

    fn sample(&self, rng: &mut SynthRng, partial: Self::Partial) -> SynthResult<Self::Meta> {
        let idx = match partial.idx {
            Some(i) => i,
            None => self.choice.sample(rng),
        };
        let meta = self.child(idx)?.sample(rng, partial.meta.unwrap_or_default())?;
        Ok(SelectorMeta { idx, meta })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &Self::Meta) -> SynthResult<()> {
        self.child(meta.idx)?.apply_meta(layers, &meta.meta)
    }

    fn data(&self, meta: &Self::Meta) -> SynthResult<ComponentData> {
        self.child(meta.idx)?.data(&meta.meta)
    }
}

/// Resolved meta of a [`Sequence`]: one entry per component, in order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SequenceMeta<M> {
    /// Child metas.
    pub metas: Vec<M>,
}

/// Partial meta of a [`Sequence`]; missing trailing entries are drawn.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(bound(
    serialize = "P: serde::Serialize",
    deserialize = "P: serde::de::DeserializeOwned"
))]
pub struct SequencePartial<P> {
    /// Child partial metas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metas: Vec<P>,
}

impl<P> Default for SequencePartial<P> {
    fn default() -> Self {
        Self { metas: Vec::new() }
    }
}

impl<M, P: From<M>> From<SequenceMeta<M>> for SequencePartial<P> {
    fn from(meta: SequenceMeta<M>) -> Self {
        Self {
            metas: meta.metas.into_iter().map(P::from).collect(),
        }
    }
}

/// Applies every component in a fixed order.
#[derive(Clone, Debug)]
pub struct Sequence<C> {
    components: Vec<C>,
}

impl<C: Component> Sequence<C> {
    /// Chain `components`.
    pub fn new(components: Vec<C>) -> Self {
        Self { components }
    }

    /// The chained components.
    pub fn components(&self) -> &[C] {
        &self.components
    }

    fn check_len(&self, n: usize) -> SynthResult<()> {
        if n != self.components.len() {
            return Err(SynthError::config(format!(
                "sequence of {} components got {n} metas",
                self.components.len()
            )));
        }
        Ok(())
    }
}

impl<C: Component> Component for Sequence<C> {
    type Meta = SequenceMeta<C::Meta>;
    type Partial = SequencePartial<C::Partial>;

    fn sample(&self, rng: &mut SynthRng, partial: Self::Partial) -> SynthResult<Self::Meta> {
        if partial.metas.len() > self.components.len() {
            return Err(SynthError::config(format!(
                "sequence of {} components got {} partial metas",
                self.components.len(),
                partial.metas.len()
            )));
        }
        let mut given = partial.metas.into_iter();
        let metas = self
            .components
            .iter()
            .map(|c| c.sample(rng, given.next().unwrap_or_default()))
            .collect::<SynthResult<Vec<_>>>()?;
        Ok(SequenceMeta { metas })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &Self::Meta) -> SynthResult<()> {
        self.check_len(meta.metas.len())?;
        for (c, m) in self.components.iter().zip(&meta.metas) {
            c.apply_meta(layers, m)?;
        }
        Ok(())
    }

    fn data(&self, meta: &Self::Meta) -> SynthResult<ComponentData> {
        self.check_len(meta.metas.len())?;
        let items = self
            .components
            .iter()
            .zip(&meta.metas)
            .map(|(c, m)| c.data(m))
            .collect::<SynthResult<Vec<_>>>()?;
        Ok(ComponentData::List(items))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/wrapper.rs"]
mod tests;
