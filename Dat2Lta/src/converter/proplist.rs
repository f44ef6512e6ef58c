//! Property lists shared by the LTA builders

use crate::formats::dat::{KeyFramerKey, PropertyBag, PropertyValue, WorldObject};
use crate::formats::lta::{PropData, PropEntry, PropList};
use glam::{EulerRot, Quat, Vec3};

/// What a brush property list is built from.
#[derive(Debug, Clone, Copy)]
pub struct BrushProps<'a> {
    pub name: &'a str,
    pub brush_type: &'a str,
    pub lighting: &'a str,
    pub not_a_step: bool,
    /// Written only when present.
    pub texture_effect: Option<&'a str>,
    /// Default for the `group1` lighting switches.
    pub lit: bool,
    /// Authored values override the defaults.
    pub attributes: Option<&'a PropertyBag>,
}

impl<'a> BrushProps<'a> {
    #[must_use]
    pub fn new(name: &'a str, brush_type: &'a str, lighting: &'a str) -> Self {
        Self {
            name,
            brush_type,
            lighting,
            not_a_step: false,
            texture_effect: None,
            lit: true,
            attributes: None,
        }
    }

    #[must_use]
    pub fn with_not_a_step(mut self, not_a_step: bool) -> Self {
        self.not_a_step = not_a_step;
        self
    }

    #[must_use]
    pub fn with_texture_effect(mut self, effect: Option<&'a str>) -> Self {
        self.texture_effect = effect;
        self
    }

    #[must_use]
    pub fn unlit(mut self) -> Self {
        self.lit = false;
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: &'a PropertyBag) -> Self {
        self.attributes = Some(attributes);
        self
    }

    fn bool_attr(&self, key: &str, default: bool) -> bool {
        self.attributes.and_then(|a| a.get_bool(key)).unwrap_or(default)
    }

    fn number_attr(&self, key: &str, default: f32) -> f32 {
        match self.attributes.and_then(|a| a.get(key)).map(|p| &p.value) {
            Some(PropertyValue::Real(x) | PropertyValue::LongInt(x)) => *x,
            _ => default,
        }
    }

    fn color_attr(&self, key: &str) -> Vec3 {
        self.attributes.and_then(|a| a.get_vec3(key)).unwrap_or(Vec3::ZERO)
    }
}

/// The editor's full brush property list, in its canonical order.
#[must_use]
pub fn brush_proplist(props: &BrushProps<'_>) -> PropList {
    let mut list = PropList::new();
    list.push(PropEntry::new("Name", PropData::String(props.name.to_string())));
    list.push(PropEntry::new("Pos", PropData::Vector(Vec3::ZERO)).with_attributes(&["distance"]));
    list.push(PropEntry::new("Rotation", PropData::Rotation(Vec3::ZERO)));
    list.push(PropEntry::new("RenderGroup", PropData::LongInt(0.0)));
    list.push(
        PropEntry::new("Type", PropData::String(props.brush_type.to_string()))
            .with_attributes(&["staticlist"]),
    );
    list.push(
        PropEntry::new("Lighting", PropData::String(props.lighting.to_string()))
            .with_attributes(&["staticlist"]),
    );
    list.push(PropEntry::new("NotAStep", PropData::Bool(props.not_a_step)));
    list.push(PropEntry::new("Detail", PropData::Bool(props.bool_attr("Detail", false))));
    list.push(
        PropEntry::new("LightControl", PropData::LongInt(props.number_attr("LightControl", 0.0)))
            .with_attributes(&["groupowner", "group1"]),
    );
    if let Some(effect) = props.texture_effect {
        list.push(
            PropEntry::new("TextureEffect", PropData::String(effect.to_string()))
                .with_attributes(&["textureeffect"]),
        );
    }
    list.push(
        PropEntry::new("AmbientLight", PropData::Color(props.color_attr("AmbientLight")))
            .with_attributes(&["group1"]),
    );
    list.push(
        PropEntry::new("LMGridSize", PropData::LongInt(props.number_attr("LMGridSize", 0.0)))
            .with_attributes(&["group1"]),
    );
    for key in ["ClipLight", "CastShadowMesh", "ReceiveLight", "ReceiveShadows", "ReceiveSunlight"] {
        list.push(
            PropEntry::new(key, PropData::Bool(props.bool_attr(key, props.lit)))
                .with_attributes(&["group1"]),
        );
    }
    list.push(
        PropEntry::new("LightPenScale", PropData::Real(props.number_attr("LightPenScale", 0.0)))
            .with_attributes(&["group1"]),
    );
    list.push(
        PropEntry::new("CreaseAngle", PropData::Real(props.number_attr("CreaseAngle", 45.0)))
            .with_attributes(&["group1"]),
    );
    list
}

/// Euler angles (pitch, yaw, roll) in radians.
#[must_use]
pub fn quat_to_euler(q: Quat) -> Vec3 {
    if q.length_squared() < f32::EPSILON {
        return Vec3::ZERO;
    }
    let (yaw, pitch, roll) = q.normalize().to_euler(EulerRot::YXZ);
    Vec3::new(pitch, yaw, roll)
}

/// Property list of a placed object; `Pos` is shifted by `offset`.
#[must_use]
pub fn object_proplist(object: &WorldObject, offset: Vec3) -> PropList {
    let mut list = PropList::new();
    for (key, prop) in object.properties.iter() {
        let entry = match &prop.value {
            PropertyValue::String(s) => PropEntry::new(key, PropData::String(s.clone())),
            PropertyValue::Vector(v) => {
                let v = if key == "Pos" { *v + offset } else { *v };
                PropEntry::new(key, PropData::Vector(v)).with_attributes(&["distance"])
            }
            PropertyValue::Color(c) => PropEntry::new(key, PropData::Color(*c)),
            PropertyValue::Real(x) => PropEntry::new(key, PropData::Real(*x)),
            PropertyValue::Bool(b) => PropEntry::new(key, PropData::Bool(*b)),
            PropertyValue::LongInt(x) => PropEntry::new(key, PropData::LongInt(*x)),
            PropertyValue::Rotation(q) => PropEntry::new(key, PropData::Rotation(quat_to_euler(*q))),
            PropertyValue::Raw { .. } => PropEntry::empty("string", key).with_attributes(&["hidden"]),
        };
        list.push(entry);
    }
    list
}

/// Property list of one KeyFramer key.
#[must_use]
pub fn key_proplist(key: &KeyFramerKey, offset: Vec3) -> PropList {
    let optional_string = |name: &str, value: &str, attributes: &[&'static str]| {
        if value.is_empty() {
            PropEntry::empty("string", name).with_attributes(attributes)
        } else {
            PropEntry::new(name, PropData::String(value.to_string())).with_attributes(attributes)
        }
    };

    let mut list = PropList::new();
    list.push(PropEntry::new("Name", PropData::String(key.name.clone())));
    list.push(PropEntry::new("Pos", PropData::Vector(key.position + offset)).with_attributes(&["distance"]));
    list.push(PropEntry::new("Rotation", PropData::Rotation(key.rotation)));
    list.push(PropEntry::new("RenderGroup", PropData::LongInt(0.0)));
    list.push(PropEntry::new("TimeStamp", PropData::Real(key.timestamp)));
    list.push(optional_string("SoundName", &key.sound_name, &[]));
    list.push(PropEntry::new("SoundRadius", PropData::Real(key.sound_radius)).with_attributes(&["radius"]));
    list.push(optional_string("Command", &key.command, &["notifychange"]));
    list.push(
        PropEntry::new("BezierPrev", PropData::Vector(key.bezier_prev.unwrap_or(Vec3::ZERO)))
            .with_attributes(&["bezierprevtangent"]),
    );
    list.push(
        PropEntry::new("BezierNext", PropData::Vector(key.bezier_next.unwrap_or(Vec3::ZERO)))
            .with_attributes(&["beziernexttangent"]),
    );
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::dat::Property;

    fn names(list: &PropList) -> Vec<&str> {
        list.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_brush_proplist_order() {
        let list = brush_proplist(&BrushProps::new("RN0_S0", "Normal", "Gouraud"));
        assert_eq!(
            names(&list),
            vec![
                "Name", "Pos", "Rotation", "RenderGroup", "Type", "Lighting", "NotAStep", "Detail",
                "LightControl", "AmbientLight", "LMGridSize", "ClipLight", "CastShadowMesh",
                "ReceiveLight", "ReceiveShadows", "ReceiveSunlight", "LightPenScale", "CreaseAngle",
            ]
        );
        assert_eq!(list.get("CreaseAngle").unwrap().data, Some(PropData::Real(45.0)));
    }

    #[test]
    fn test_brush_proplist_texture_effect_and_overrides() {
        let mut authored = PropertyBag::new();
        authored.set("AmbientLight", PropertyValue::Color(Vec3::splat(8.0)));
        authored.set("LMGridSize", PropertyValue::LongInt(16.0));
        let props = BrushProps::new("Door_0_S0", "Normal", "Lightmap")
            .with_texture_effect(Some("Glass01"))
            .with_attributes(&authored);
        let list = brush_proplist(&props);

        let effect = list.get("TextureEffect").unwrap();
        assert_eq!(effect.data, Some(PropData::String("Glass01".into())));
        assert_eq!(effect.attributes, vec!["textureeffect"]);
        assert_eq!(list.get("AmbientLight").unwrap().data, Some(PropData::Color(Vec3::splat(8.0))));
        assert_eq!(list.get("LMGridSize").unwrap().data, Some(PropData::LongInt(16.0)));
    }

    #[test]
    fn test_unlit_brush_switches_off() {
        let list = brush_proplist(&BrushProps::new("Blocker", "Blocker", "Flat").unlit());
        assert_eq!(list.get("ReceiveLight").unwrap().data, Some(PropData::Bool(false)));
        assert!(!list.contains("TextureEffect"));
    }

    #[test]
    fn test_object_proplist_offsets_pos_and_hides_raw() {
        let mut object = WorldObject {
            type_name: "Light".into(),
            ..WorldObject::default()
        };
        object.properties.set("Name", PropertyValue::String("Light0".into()));
        object.properties.set("Pos", PropertyValue::Vector(Vec3::new(1.0, 2.0, 3.0)));
        object.properties.set("Dims", PropertyValue::Vector(Vec3::ONE));
        object.properties.insert(
            "Blob",
            Property::new(PropertyValue::Raw { data_type: 9, bytes: vec![1, 2] }),
        );

        let list = object_proplist(&object, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(list.get("Pos").unwrap().data, Some(PropData::Vector(Vec3::new(11.0, 2.0, 3.0))));
        assert_eq!(list.get("Dims").unwrap().data, Some(PropData::Vector(Vec3::ONE)));
        let blob = list.get("Blob").unwrap();
        assert_eq!(blob.data, None);
        assert_eq!(blob.attributes, vec!["hidden"]);
    }

    #[test]
    fn test_quat_to_euler() {
        assert!(quat_to_euler(Quat::IDENTITY).length() < 1e-6);
        let yaw = quat_to_euler(Quat::from_rotation_y(0.5));
        assert!((yaw - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-5);
        assert_eq!(quat_to_euler(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn test_key_proplist_empty_strings_have_no_data() {
        let key = KeyFramerKey {
            name: "Path0".into(),
            key_type: 0,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            timestamp: 1.5,
            sound_radius: 0.0,
            sound_name: String::new(),
            command: "msg door open".into(),
            bezier_prev: None,
            bezier_next: Some(Vec3::X),
        };
        let list = key_proplist(&key, Vec3::ZERO);
        assert_eq!(list.get("SoundName").unwrap().data, None);
        assert_eq!(
            list.get("Command").unwrap().data,
            Some(PropData::String("msg door open".into()))
        );
        assert_eq!(list.get("BezierPrev").unwrap().data, Some(PropData::Vector(Vec3::ZERO)));
        assert_eq!(list.get("BezierNext").unwrap().data, Some(PropData::Vector(Vec3::X)));
    }
}
