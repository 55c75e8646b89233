use crate::Drug;

#[cfg(test)]
use crate::{Session, generate_options};
#[cfg(test)]
use rand::SeedableRng;

/// (name, moa, indications, adverse events, interactions, contraindications)
type DemoEntry = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const DEMO_ENTRIES: [DemoEntry; 10] = [
    (
        "Dopamine (Intropin)",
        "Dose-dependent effects: Low-dose stimulates D1/D2 receptors, Intermediate-dose binds β-1 receptors, High-dose α-1 activity dominates",
        "Hemodynamic support and inotropic support in advanced heart failure",
        "Severe hypertension, Ventricular arrhythmias, Cardiac ischemia, Tissue ischemia/gangrene",
        "",
        "",
    ),
    (
        "Norepinephrine (Levophed)",
        "Potent α-1 effects with modest β effects. Reflex bradycardia usually occurs in response to increased MAP",
        "Preferred vasopressor in septic, cardiogenic, and hypovolemic shock and ACLS",
        "Arrhythmias, Bradycardia, Peripheral (digital) ischemia, HTN",
        "Nonselective β-blockers can cause HTN",
        "",
    ),
    (
        "Epinephrine (Adrenalin)",
        "Potent β-1 activity and moderate β-2 and α-1 effects. β effects > at low doses. α-1 effects > at higher doses",
        "Treatment of anaphylaxis, ACLS (asystole/pulseless arrest), 2nd-line agent in septic shock",
        "Ventricular arrhythmias, Severe HTN, Cardiac ischemia, Sudden cardiac death",
        "",
        "",
    ),
    (
        "Lisinopril (Prinivil, Zestril)",
        "Inhibits ACE in the lungs. Block conversion of angiotensin I to angiotensin II. Inhibit inactivation of bradykinin",
        "HTN: 1st-line option. Always use in patients with DM, CKD if no CI. AMI, HF",
        "Hyperkalemia, Hypotension, Acute Renal Failure, Dry Cough, Angioedema",
        "",
        "Pregnancy: Fetotoxic",
    ),
    (
        "Metoprolol succinate (Toprol XL)",
        "β-adrenergic receptor antagonist → Decrease CO → Decrease sympathetic outflow → Inhibit renin release. Cardioselective",
        "Heart failure, Acute MI, Angina, Arrhythmias, Hypertension",
        "CNS Effects, Sexual Dysfunction, Asthma/COPD Exacerbation, mask symptoms of hypoglycemia",
        "Do NOT combine with non-DHP CCBs",
        "Caution with selective agents in asthma",
    ),
    (
        "Furosemide (Lasix)",
        "Inhibit renal Na+(Cl-) reabsorption and co-transport of Na+/K+/2Cl- in the thick ascending loop of Henle",
        "Pulmonary edema, Peripheral edema, Heart failure, Acute hypercalcemia",
        "Ototoxicity (rapid IV), Hypovolemia, K wasting, Hyperuricemia, Hypomagnesemia",
        "Monitor all electrolytes",
        "Avoid w/ sulfa allergy",
    ),
    (
        "Warfarin",
        "Inhibits activation of vitamin K dependent clotting factors (Seven, Nine, Ten, Two). Also inhibits proteins C and S",
        "Prophylaxis of DVT and PE, Stroke prophylaxis in atrial fibrillation, Mechanical heart valve",
        "Bleeding, Teratogenic, Skin necrosis",
        "Amiodarone, Fluoroquinolones, Azole antifungals increase INR. Rifampin, Phenytoin decrease INR",
        "Hemorrhagic tendencies, Pregnancy, Hepatic impairment",
    ),
    (
        "Atorvastatin (Lipitor)",
        "Inhibit HMG-CoA reductase. Inhibit cholesterol synthesis. Increase cell-surface LDL receptors. Stabilize plaques",
        "First line therapy. Primary and secondary prevention of ASCVD",
        "Myalgias, Myopathy and rhabdomyolysis, Hepatotoxicity, Increased risk of diabetes",
        "CYP3A4",
        "Pregnancy",
    ),
    (
        "Clopidogrel",
        "Inhibit binding of ADP to P2Y12 receptors on platelets → inhibit activation of GP IIb/IIIa receptors. Irreversible",
        "Prevention of atherosclerotic events, Prophylaxis of thrombotic events in ACS, PCI with stenting",
        "Bleeding, thrombotic thrombocytopenic purpura",
        "CYP 2C19 (activates prodrug). DDI with omeprazole and esomeprazole",
        "Active bleed",
    ),
    (
        "Amiodarone",
        "Class III: prolong repolarization. Sometimes designated as potassium channel blockers. Prolong APD without altering phase 0",
        "Atrial and ventricular arrhythmias",
        "Pulmonary toxicity, Thyroid dysfunction, Hepatotoxicity, Corneal deposits",
        "Drug Interactions! Many including warfarin, digoxin, statins",
        "Severe sinus node dysfunction, AV block",
    ),
];

/// Built-in cardiovascular drug set offered when no file is uploaded.
pub fn demo_drugs() -> Vec<Drug> {
    DEMO_ENTRIES
        .iter()
        .enumerate()
        .map(
            |(id, (name, moa, indications, adverse, interactions, contraindications))| Drug {
                id,
                name: name.to_string(),
                moa: moa.to_string(),
                indications: indications.to_string(),
                adverse: adverse.to_string(),
                interactions: interactions.to_string(),
                contraindications: contraindications.to_string(),
            },
        )
        .collect()
}
