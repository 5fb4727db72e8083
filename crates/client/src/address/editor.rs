//! Address record editor.
//!
//! The editor never owns the address being edited. Every edit is reported as
//! a [`ShippingAddressPatch`] which the owner applies to its
//! [`AddressDraft`]; region picks carry the chosen name and blank out the
//! names of the levels below it.

use std::sync::Arc;

use chodocu_core::{AddressDraft, RegionCode, ShippingAddressPatch};
use tracing::instrument;

use crate::region::RegionCatalog;
use crate::selector::{RegionHints, RegionSelector, ResolvedCodes};

/// A plain field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressEdit {
    FullName(String),
    Phone(String),
    Street(String),
    Note(String),
    DefaultShipping(bool),
    DefaultPickup(bool),
}

impl From<AddressEdit> for ShippingAddressPatch {
    fn from(edit: AddressEdit) -> Self {
        let mut patch = Self::default();
        match edit {
            AddressEdit::FullName(v) => patch.full_name = Some(v),
            AddressEdit::Phone(v) => patch.phone = Some(v),
            AddressEdit::Street(v) => patch.street = Some(v),
            AddressEdit::Note(v) => patch.note = Some(v),
            AddressEdit::DefaultShipping(v) => patch.is_default_shipping = Some(v),
            AddressEdit::DefaultPickup(v) => patch.is_default_pickup = Some(v),
        }
        patch
    }
}

/// Editor for one address, new or existing.
pub struct AddressEditor {
    selector: RegionSelector,
}

impl AddressEditor {
    #[must_use]
    pub fn new(catalog: Arc<dyn RegionCatalog>) -> Self {
        Self {
            selector: RegionSelector::new(catalog),
        }
    }

    /// The region selector behind the province, district and ward controls.
    #[must_use]
    pub const fn selector(&self) -> &RegionSelector {
        &self.selector
    }

    /// Open the editor on a blank address: load provinces only.
    pub async fn open(&self) {
        self.selector.initialize(RegionHints::default()).await;
    }

    /// Open the editor on a stored address.
    ///
    /// Stored addresses carry region names only; this is the one pass that
    /// turns them back into selector codes. Names that no longer match the
    /// catalog leave their level (and every level below) unselected.
    #[instrument(skip_all)]
    pub async fn hydrate(&self, draft: &AddressDraft) -> ResolvedCodes {
        fn hint(name: &str) -> Option<&str> {
            let name = name.trim();
            (!name.is_empty()).then_some(name)
        }

        self.selector
            .initialize(RegionHints {
                province: hint(&draft.province),
                district: hint(&draft.district),
                ward: hint(&draft.ward),
            })
            .await
    }

    /// Select a province. The patch blanks district and ward. `None` when a
    /// later selection replaced this one before its districts arrived.
    pub async fn select_province(
        &self,
        code: impl Into<RegionCode>,
    ) -> Option<ShippingAddressPatch> {
        let pick = self.selector.select_province(code).await?;
        Some(ShippingAddressPatch {
            province: Some(pick.name),
            district: Some(String::new()),
            ward: Some(String::new()),
            ..ShippingAddressPatch::default()
        })
    }

    /// Select a district. The patch blanks the ward. `None` when no province
    /// is selected or a later selection replaced this one.
    pub async fn select_district(
        &self,
        code: impl Into<RegionCode>,
    ) -> Option<ShippingAddressPatch> {
        let pick = self.selector.select_district(code).await?;
        Some(ShippingAddressPatch {
            district: Some(pick.name),
            ward: Some(String::new()),
            ..ShippingAddressPatch::default()
        })
    }

    /// Select a ward. `None` when no district is selected.
    pub async fn select_ward(&self, code: impl Into<RegionCode>) -> Option<ShippingAddressPatch> {
        let pick = self.selector.select_ward(code).await?;
        Some(ShippingAddressPatch {
            ward: Some(pick.name),
            ..ShippingAddressPatch::default()
        })
    }

    /// Close the editor. Region loads still in flight are dropped.
    pub fn close(&self) {
        self.selector.detach();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chodocu_core::{Field, RegionLevel};

    use super::*;
    use crate::testing::{FakeCatalog, address};

    fn editor(catalog: &Arc<FakeCatalog>) -> AddressEditor {
        AddressEditor::new(catalog.clone())
    }

    #[test]
    fn test_field_edit_patch_touches_one_field() {
        let patch = ShippingAddressPatch::from(AddressEdit::Phone("0987654321".to_string()));
        assert_eq!(
            patch,
            ShippingAddressPatch {
                phone: Some("0987654321".to_string()),
                ..ShippingAddressPatch::default()
            }
        );
        let patch = ShippingAddressPatch::from(AddressEdit::DefaultPickup(true));
        assert_eq!(patch.is_default_pickup, Some(true));
        assert_eq!(patch.is_default_shipping, None);
    }

    #[tokio::test]
    async fn test_hydrate_resolves_stored_names() {
        let catalog = Arc::new(FakeCatalog::hanoi());
        let editor = editor(&catalog);
        let draft = AddressDraft::from_address(&address("a", "Nguyễn Văn A"));

        let codes = editor.hydrate(&draft).await;

        assert_eq!(codes.province, Some(RegionCode::new("01")));
        assert_eq!(codes.district, Some(RegionCode::new("001")));
        assert_eq!(codes.ward, Some(RegionCode::new("00001")));
    }

    #[tokio::test]
    async fn test_hydrate_unknown_province_loads_nothing_below() {
        let catalog = Arc::new(FakeCatalog::hanoi());
        let editor = editor(&catalog);
        let draft = AddressDraft {
            province: "Hải Phòng".to_string(),
            district: "Cầu Giấy".to_string(),
            ..AddressDraft::default()
        };

        let codes = editor.hydrate(&draft).await;

        assert_eq!(codes, ResolvedCodes::default());
        assert_eq!(catalog.calls(), vec!["provinces"]);
    }

    #[tokio::test]
    async fn test_region_picks_flow_into_draft() {
        let catalog = Arc::new(FakeCatalog::hanoi());
        let editor = editor(&catalog);
        let mut draft = AddressDraft {
            province: "Hồ Chí Minh".to_string(),
            district: "Quận 1".to_string(),
            ward: "Bến Nghé".to_string(),
            ..AddressDraft::default()
        };
        editor.open().await;

        draft.apply(&editor.select_province("01").await.unwrap());
        assert_eq!(draft.province, "Hà Nội");
        assert!(draft.district.is_empty());
        assert!(draft.ward.is_empty());

        draft.apply(&editor.select_district("001").await.unwrap());
        draft.apply(&editor.select_ward("00001").await.unwrap());
        assert_eq!(draft.district, "Cầu Giấy");
        assert_eq!(draft.ward, "Dịch Vọng");
    }

    #[tokio::test]
    async fn test_superseded_province_pick_is_not_applied() {
        let catalog = Arc::new(
            FakeCatalog::hanoi()
                .with_province("79", "Hồ Chí Minh")
                .with_districts("79", &[("760", "Quận 1")]),
        );
        let editor = Arc::new(editor(&catalog));
        editor.open().await;
        let mut draft = AddressDraft::default();

        let gate = catalog.gate("districts:01");
        let first = tokio::spawn({
            let editor = editor.clone();
            async move { editor.select_province("01").await }
        });
        catalog.wait_for_call("districts:01").await;

        draft.apply(&editor.select_province("79").await.unwrap());
        gate.open();
        if let Some(late) = first.await.unwrap() {
            draft.apply(&late);
        }

        assert_eq!(draft.province, "Hồ Chí Minh");
        assert_eq!(
            editor.selector().selection(RegionLevel::Province),
            Some(RegionCode::new("79"))
        );
    }

    #[tokio::test]
    async fn test_select_district_without_province() {
        let catalog = Arc::new(FakeCatalog::hanoi());
        let editor = editor(&catalog);
        editor.open().await;
        assert!(editor.select_district("001").await.is_none());
    }

    #[tokio::test]
    async fn test_draft_without_phone_fails_validation() {
        let catalog = Arc::new(FakeCatalog::hanoi());
        let editor = editor(&catalog);
        let mut draft = AddressDraft::from_address(&address("a", "Nguyễn Văn A"));
        editor.hydrate(&draft).await;

        draft.apply(&AddressEdit::Phone(String::new()).into());
        let errors = draft.validate().unwrap_err();
        assert!(errors.contains(Field::Phone));
        assert_eq!(errors.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_close_detaches_selector() {
        let catalog = Arc::new(FakeCatalog::hanoi());
        let editor = editor(&catalog);
        editor.open().await;
        editor.close();
        assert!(editor.selector().is_detached());
        assert!(editor.selector().is_enabled(RegionLevel::Province));
    }
}
