//! Change detection cursor over the binding slots of a view.
//!
//! Binding slots follow the structural slots. The first binding of a view
//! fixes `binding_start_index`; on every later refresh the cursor starts
//! there and advances one slot per binding instruction.

use smallvec::{smallvec, SmallVec};

use crate::render3::assert::{assert_equal, assert_less_than};
use crate::render3::interfaces::view::Slot;
use crate::render3::runtime::Runtime;
use crate::render3::value::{is_different, stringify, Bound, Value};

type Args = SmallVec<[Bound; 4]>;

impl Runtime {
    /// Stores `value` in the next binding slot.
    ///
    /// Returns the value when it differs from the stored one (always, on
    /// creation) and [`Bound::NoChange`] otherwise. Passing `NoChange` never
    /// counts as a change.
    pub fn bind(&mut self, value: impl Into<Bound>) -> Bound {
        let value = value.into();
        let view = self.current_view();

        if self.state.creation_mode {
            let lview = &mut self.views[view];
            lview.binding_start_index.get_or_insert(lview.data.len());
            lview.data.push(Slot::Binding(value.clone().changed().unwrap_or_default()));
            return value;
        }

        let index = self.next_binding_index();
        let Bound::Value(value) = value else {
            return Bound::NoChange;
        };
        match self.views[view].data.get_mut(index) {
            Some(Slot::Binding(stored)) => {
                if is_different(stored, &value) {
                    *stored = value.clone();
                    Bound::Value(value)
                } else {
                    Bound::NoChange
                }
            }
            other => panic!("ASSERTION ERROR: expected a binding slot at {}, found {:?}", index, other),
        }
    }

    /// `prefix{{v0}}suffix`
    pub fn bind1(&mut self, prefix: &str, v0: impl Into<Bound>, suffix: &str) -> Bound {
        self.bind_interpolation(&[prefix, suffix], smallvec![v0.into()])
    }

    pub fn bind2(&mut self, prefix: &str, v0: impl Into<Bound>, i0: &str, v1: impl Into<Bound>, suffix: &str) -> Bound {
        self.bind_interpolation(&[prefix, i0, suffix], smallvec![v0.into(), v1.into()])
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bind3(
        &mut self,
        prefix: &str,
        v0: impl Into<Bound>,
        i0: &str,
        v1: impl Into<Bound>,
        i1: &str,
        v2: impl Into<Bound>,
        suffix: &str,
    ) -> Bound {
        self.bind_interpolation(&[prefix, i0, i1, suffix], smallvec![v0.into(), v1.into(), v2.into()])
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bind4(
        &mut self,
        prefix: &str,
        v0: impl Into<Bound>,
        i0: &str,
        v1: impl Into<Bound>,
        i1: &str,
        v2: impl Into<Bound>,
        i2: &str,
        v3: impl Into<Bound>,
        suffix: &str,
    ) -> Bound {
        self.bind_interpolation(
            &[prefix, i0, i1, i2, suffix],
            smallvec![v0.into(), v1.into(), v2.into(), v3.into()],
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bind5(
        &mut self,
        prefix: &str,
        v0: impl Into<Bound>,
        i0: &str,
        v1: impl Into<Bound>,
        i1: &str,
        v2: impl Into<Bound>,
        i2: &str,
        v3: impl Into<Bound>,
        i3: &str,
        v4: impl Into<Bound>,
        suffix: &str,
    ) -> Bound {
        self.bind_interpolation(
            &[prefix, i0, i1, i2, i3, suffix],
            smallvec![v0.into(), v1.into(), v2.into(), v3.into(), v4.into()],
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bind6(
        &mut self,
        prefix: &str,
        v0: impl Into<Bound>,
        i0: &str,
        v1: impl Into<Bound>,
        i1: &str,
        v2: impl Into<Bound>,
        i2: &str,
        v3: impl Into<Bound>,
        i3: &str,
        v4: impl Into<Bound>,
        i4: &str,
        v5: impl Into<Bound>,
        suffix: &str,
    ) -> Bound {
        self.bind_interpolation(
            &[prefix, i0, i1, i2, i3, i4, suffix],
            smallvec![v0.into(), v1.into(), v2.into(), v3.into(), v4.into(), v5.into()],
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bind7(
        &mut self,
        prefix: &str,
        v0: impl Into<Bound>,
        i0: &str,
        v1: impl Into<Bound>,
        i1: &str,
        v2: impl Into<Bound>,
        i2: &str,
        v3: impl Into<Bound>,
        i3: &str,
        v4: impl Into<Bound>,
        i4: &str,
        v5: impl Into<Bound>,
        i5: &str,
        v6: impl Into<Bound>,
        suffix: &str,
    ) -> Bound {
        self.bind_interpolation(
            &[prefix, i0, i1, i2, i3, i4, i5, suffix],
            smallvec![v0.into(), v1.into(), v2.into(), v3.into(), v4.into(), v5.into(), v6.into()],
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bind8(
        &mut self,
        prefix: &str,
        v0: impl Into<Bound>,
        i0: &str,
        v1: impl Into<Bound>,
        i1: &str,
        v2: impl Into<Bound>,
        i2: &str,
        v3: impl Into<Bound>,
        i3: &str,
        v4: impl Into<Bound>,
        i4: &str,
        v5: impl Into<Bound>,
        i5: &str,
        v6: impl Into<Bound>,
        i6: &str,
        v7: impl Into<Bound>,
        suffix: &str,
    ) -> Bound {
        self.bind_interpolation(
            &[prefix, i0, i1, i2, i3, i4, i5, i6, suffix],
            smallvec![
                v0.into(),
                v1.into(),
                v2.into(),
                v3.into(),
                v4.into(),
                v5.into(),
                v6.into(),
                v7.into()
            ],
        )
    }

    /// Interpolation of any arity: `statics` has one more entry than
    /// `values` and the two alternate, starting with a static.
    pub fn bind_v(&mut self, statics: &[&str], values: Vec<Bound>) -> Bound {
        self.bind_interpolation(statics, values.into_iter().collect())
    }

    fn bind_interpolation(&mut self, statics: &[&str], values: Args) -> Bound {
        assert_equal(statics.len(), values.len() + 1, "interpolation statics must surround values");
        let view = self.current_view();

        if self.state.creation_mode {
            let lview = &mut self.views[view];
            lview.binding_start_index.get_or_insert(lview.data.len());
            let stored: SmallVec<[Value; 4]> = values
                .into_iter()
                .map(|value| value.changed().unwrap_or_default())
                .collect();
            let rendered = interpolate(statics, &stored);
            lview.data.push(Slot::Bindings(stored));
            return Bound::Value(Value::from(rendered));
        }

        let index = self.next_binding_index();
        let stored = match self.views[view].data.get_mut(index) {
            Some(Slot::Bindings(stored)) => stored,
            other => panic!("ASSERTION ERROR: expected an interpolation slot at {}, found {:?}", index, other),
        };
        assert_equal(stored.len(), values.len(), "interpolation arity changed");

        let mut changed = false;
        for (slot, value) in stored.iter_mut().zip(values) {
            if let Bound::Value(value) = value {
                if is_different(slot, &value) {
                    *slot = value;
                    changed = true;
                }
            }
        }
        if changed {
            Bound::Value(Value::from(interpolate(statics, stored)))
        } else {
            Bound::NoChange
        }
    }

    fn next_binding_index(&mut self) -> usize {
        let index = self.state.binding_index;
        assert_less_than(
            index,
            self.views[self.current_view()].data.len(),
            "binding index should be within the view data",
        );
        self.state.binding_index += 1;
        index
    }
}

fn interpolate(statics: &[&str], values: &[Value]) -> String {
    let mut rendered = String::from(statics[0]);
    for (value, after) in values.iter().zip(&statics[1..]) {
        rendered.push_str(&stringify(value));
        rendered.push_str(after);
    }
    rendered
}
