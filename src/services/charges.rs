use crate::models::Charges;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeField {
    Linehaul,
    FuelSurcharge,
    Accessorial,
    TotalAmountDue,
}

/// Applies one charge edit. Editing any of the three component charges
/// recomputes the total; setting the total directly is a manual override
/// and is left exactly as given, with no recompute.
pub fn apply_charge_edit(charges: &mut Charges, field: ChargeField, value: f64) {
    match field {
        ChargeField::Linehaul => charges.linehaul = value,
        ChargeField::FuelSurcharge => charges.fuel_surcharge = value,
        ChargeField::Accessorial => charges.accessorial = value,
        ChargeField::TotalAmountDue => {
            charges.total_amount_due = value;
            return;
        }
    }
    charges.total_amount_due = charges.linehaul + charges.fuel_surcharge + charges.accessorial;
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn component_edits_keep_the_total_consistent() {
        let mut charges = Charges::default();

        apply_charge_edit(&mut charges, ChargeField::Linehaul, 640.0);
        assert!((charges.total_amount_due - 640.0).abs() < EPS);

        apply_charge_edit(&mut charges, ChargeField::FuelSurcharge, 60.0);
        assert!((charges.total_amount_due - 700.0).abs() < EPS);

        apply_charge_edit(&mut charges, ChargeField::Accessorial, 25.5);
        assert!((charges.total_amount_due - 725.5).abs() < EPS);

        apply_charge_edit(&mut charges, ChargeField::Linehaul, 100.0);
        assert!((charges.total_amount_due - 185.5).abs() < EPS);
    }

    #[test]
    fn repeated_edits_in_any_order_hold_the_invariant() {
        let mut charges = Charges::default();
        let edits = [
            (ChargeField::Accessorial, 10.0),
            (ChargeField::Linehaul, 500.0),
            (ChargeField::FuelSurcharge, 42.42),
            (ChargeField::Accessorial, 0.0),
            (ChargeField::FuelSurcharge, 17.17),
            (ChargeField::Linehaul, 640.0),
        ];
        for (field, value) in edits {
            apply_charge_edit(&mut charges, field, value);
            let expected = charges.linehaul + charges.fuel_surcharge + charges.accessorial;
            assert!((charges.total_amount_due - expected).abs() < EPS);
        }
    }

    #[test]
    fn direct_total_edit_is_terminal() {
        let mut charges = Charges {
            linehaul: 640.0,
            fuel_surcharge: 60.0,
            accessorial: 0.0,
            total_amount_due: 700.0,
        };

        apply_charge_edit(&mut charges, ChargeField::TotalAmountDue, 650.0);
        assert!((charges.total_amount_due - 650.0).abs() < EPS);
        // Components untouched; the invariant is knowingly broken here.
        assert!((charges.linehaul - 640.0).abs() < EPS);

        // The next component edit re-establishes the derived total.
        apply_charge_edit(&mut charges, ChargeField::Accessorial, 10.0);
        assert!((charges.total_amount_due - 710.0).abs() < EPS);
    }
}
