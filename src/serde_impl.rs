use core::fmt;
use core::marker::PhantomData;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{AccessRights, ConstSid, SecurityIdentifier, Sid};

impl Serialize for Sid<'_> {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_bytes(self.as_binary())
        }
    }
}

impl<'de: 'a, 'a> Deserialize<'de> for Sid<'a> {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SidVisitor<'a>(PhantomData<Sid<'a>>);

        impl<'de: 'a, 'a> de::Visitor<'de> for SidVisitor<'a> {
            type Value = Sid<'a>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a SID as borrowed raw binary")
            }

            fn visit_borrowed_bytes<E>(self, v: &'de [u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Sid::from_bytes(v).map_err(|_| E::invalid_value(de::Unexpected::Bytes(v), &self))
            }
        }
        deserializer.deserialize_bytes(SidVisitor(PhantomData))
    }
}

impl Serialize for SecurityIdentifier {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_sid().serialize(serializer)
    }
}

impl<const N: usize> Serialize for ConstSid<N> {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_security_identifier().serialize(serializer)
    }
}

// Generic helper to deserialize types that support FromStr and TryFrom<&[u8]>
fn deserialize_sid_like<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    for<'a> T: FromStr + TryFrom<&'a [u8]>,
{
    struct Visitor<T>(PhantomData<T>);

    impl<T> de::Visitor<'_> for Visitor<T>
    where
        for<'a> T: FromStr + TryFrom<&'a [u8]>,
    {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a SID as a string (e.g., \"S-1-...\") or as raw binary")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            T::from_str(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            T::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Bytes(v), &self))
        }
    }

    if deserializer.is_human_readable() {
        deserializer.deserialize_str(Visitor::<T>(PhantomData))
    } else {
        deserializer.deserialize_bytes(Visitor::<T>(PhantomData))
    }
}

impl<'de> Deserialize<'de> for SecurityIdentifier {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_sid_like(deserializer)
    }
}

impl Serialize for AccessRights {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for AccessRights {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Self::from_bits_retain)
    }
}
