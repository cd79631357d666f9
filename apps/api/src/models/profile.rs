use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::coerce;
use super::photo::Photo;

/// Declares a set of yes/no toggles together with their display labels.
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $field:ident => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            $(
                #[serde(deserialize_with = "coerce::flag")]
                pub $field: bool,
            )+
        }

        impl $name {
            /// Labels of every enabled flag, in declaration order.
            pub fn enabled_labels(&self) -> Vec<&'static str> {
                let mut labels = Vec::new();
                $(
                    if self.$field {
                        labels.push($label);
                    }
                )+
                labels
            }
        }
    };
}

flag_set! {
    /// Languages the person speaks.
    pub struct LanguageFlags {
        de => "DE",
        en => "EN",
        fr => "FR",
        it => "IT",
        pl => "PL",
        ro => "RO",
        pt => "PT",
        nl => "NL",
        cn => "CN",
        other => "Other",
    }
}

flag_set! {
    /// Services included in the base rate.
    pub struct IncludedServices {
        kiss => "Kiss",
        cuddling => "Cuddling",
        tongue_kiss => "Tongue kiss",
        private_massage => "Private massage",
        body_to_body_massage => "Body-to-body massage",
        erotic => "Erotic",
        massage => "Massage",
        lick_balls => "Lick balls",
        girlfriend_sex => "Girlfriend sex",
        all_positions => "Sex in all positions",
        sixty_nine => "69",
        lingerie => "Lingerie",
        bath_play => "Bath play",
        shower_play => "Shower play",
        bj_with_condom => "BJ with condom",
        bj_without_condom => "BJ without condom",
        deep_throat => "Deep throat",
        cum_on_body => "Cum on body",
        cum_multiple => "Multiple rounds",
        spanish => "Spanish",
        strap_on => "Strap-on",
        masturbation => "Masturbation",
        dildo => "Dildo",
        games => "Games",
        dirty_talk => "Dirty talk",
        role_play => "Role play",
        face_sitting => "Face sitting",
        foot_fetish => "Foot fetish",
        striptease => "Striptease",
        passive_tongue_anal => "Passive tongue anal",
    }
}

/// Profile text per locale. English and German are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Descriptions {
    #[validate(length(min = 10, message = "English description must be at least 10 characters."))]
    pub en: String,
    #[validate(length(min = 10, message = "German description must be at least 10 characters."))]
    pub de: String,
    pub fr: Option<String>,
    pub it: Option<String>,
}

/// Surcharges for services outside the base rate, in euros. `None` means not offered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ExtraServices {
    #[serde(deserialize_with = "coerce::optional_price")]
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    pub bj_cum_in_mouth: Option<f64>,
    #[serde(deserialize_with = "coerce::optional_price")]
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    pub bj_cum_in_mouth_swallow: Option<f64>,
    #[serde(deserialize_with = "coerce::optional_price")]
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    pub cum_on_body: Option<f64>,
    #[serde(deserialize_with = "coerce::optional_price")]
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    pub natursekt_active: Option<f64>,
}

impl ExtraServices {
    /// Offered extras as `(label, price)` pairs.
    pub fn priced(&self) -> Vec<(&'static str, f64)> {
        [
            ("BJ with finish in mouth", self.bj_cum_in_mouth),
            ("BJ with swallow", self.bj_cum_in_mouth_swallow),
            ("Cum on body", self.cum_on_body),
            ("Natursekt active", self.natursekt_active),
        ]
        .into_iter()
        .filter_map(|(label, price)| price.map(|p| (label, p)))
        .collect()
    }
}

/// Every editable attribute of a profile. This is the value the form produces
/// and the record stores; `validate()` decides whether it is complete.
///
/// Missing keys fall back to `Default` so that absent input is reported by the
/// field's own validation message rather than as a malformed body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileFields {
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: String,

    #[serde(deserialize_with = "coerce::whole_number")]
    #[validate(range(min = 18, message = "Age must be at least 18."))]
    pub age: u32,

    /// Centimetres.
    #[serde(deserialize_with = "coerce::whole_number")]
    #[validate(range(min = 140, message = "Height must be at least 140 cm."))]
    pub height: u32,

    /// Kilograms.
    #[serde(deserialize_with = "coerce::whole_number")]
    #[validate(range(min = 40, message = "Weight must be at least 40 kg."))]
    pub weight: u32,

    #[validate(length(min = 1, message = "Hair colour is required."))]
    pub hair_colour: String,

    #[validate(length(min = 1, message = "Eye colour is required."))]
    pub eye_colour: String,

    #[validate(length(min = 1, message = "Bust size is required."))]
    pub bust: String,

    #[validate(length(min = 1, message = "Breast type is required."))]
    pub breast_type: String,

    /// Continental dress size ("Konfektion").
    #[serde(deserialize_with = "coerce::whole_number")]
    #[validate(range(min = 1, message = "Clothing size is required."))]
    pub clothing_size: u32,

    #[serde(deserialize_with = "coerce::decimal")]
    #[validate(range(min = 1.0, message = "Shoe size is required."))]
    pub shoe_size: f32,

    #[validate(length(min = 1, message = "Private hair style is required."))]
    pub private_hair: String,

    #[serde(deserialize_with = "coerce::flag")]
    pub tattoo: bool,

    #[serde(deserialize_with = "coerce::flag")]
    pub smoker: bool,

    #[validate(length(min = 1, message = "Nationality is required."))]
    pub nationality: String,

    /// Available for escort bookings.
    #[serde(deserialize_with = "coerce::flag")]
    pub escort: bool,

    pub languages: LanguageFlags,

    #[validate(nested)]
    pub descriptions: Descriptions,

    pub services: IncludedServices,

    #[validate(nested)]
    pub extras: ExtraServices,
}

impl ProfileFields {
    /// Values a blank "create" form starts with.
    pub fn form_defaults() -> Self {
        Self {
            age: 18,
            height: 160,
            weight: 50,
            clothing_size: 36,
            shoe_size: 36.0,
            tattoo: false,
            smoker: false,
            escort: true,
            ..Self::default()
        }
    }
}

/// A stored profile. The identifier is assigned once on creation and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: ProfileFields,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_defaults() {
        let defaults = ProfileFields::form_defaults();
        assert_eq!(defaults.age, 18);
        assert_eq!(defaults.height, 160);
        assert_eq!(defaults.weight, 50);
        assert!(defaults.escort);
        assert!(!defaults.tattoo);
        assert!(defaults.languages.enabled_labels().is_empty());
        assert!(defaults.services.enabled_labels().is_empty());
    }

    #[test]
    fn test_yes_no_strings_map_to_flags() {
        let languages: LanguageFlags =
            serde_json::from_str(r#"{"de": "yes", "en": "no", "cn": true}"#).unwrap();
        assert_eq!(languages.enabled_labels(), vec!["DE", "CN"]);
    }

    #[test]
    fn test_flags_serialize_as_booleans() {
        let json = serde_json::to_value(LanguageFlags {
            it: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["it"], serde_json::json!(true));
        assert_eq!(json["de"], serde_json::json!(false));
    }

    #[test]
    fn test_priced_extras_skip_absent() {
        let extras = ExtraServices {
            cum_on_body: Some(50.0),
            ..Default::default()
        };
        assert_eq!(extras.priced(), vec![("Cum on body", 50.0)]);
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = ProfileRecord {
            id: Uuid::new_v4(),
            fields: ProfileFields {
                name: "Anna".into(),
                ..ProfileFields::form_defaults()
            },
            photos: vec![],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Anna");
        assert_eq!(json["age"], 18);
        assert!(json["photos"].as_array().unwrap().is_empty());

        let back: ProfileRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
