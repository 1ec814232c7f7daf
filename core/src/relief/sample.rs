/// Mixed field reports used by "Load Sample Data". Only some are food
/// requests; the rest are rescue or medical and should be ignored.
pub const SAMPLE_RAW_DATA: &str = r#"URGENT!! We are 14 people on the roof of Nurul Islam's house, Companiganj, Sylhet. No food and no drinking water for 2 days, children are crying. Call 01711-482913.

Need boat rescue near Chhatak bazar, water rising fast, elderly man cannot walk. Contact: 01822-331047

Shelter at Tahirpur Govt Primary School has 60 families. Rice and lentils will run out by tomorrow evening. - Headmaster Abdul Karim, 01913-775520

Medical team needed at Derai health complex, two snakebite cases.

My sister Rina is stuck with her 3 month old baby in Bishwambarpur, they need baby formula and clean water. No phone signal there.

Anyone going towards Goainghat? 5 families near the mosque ask for dry food (chira, gur) and water purification tablets. Not urgent tonight but needed this week.

Sunamganj Sadar ward 4: we have enough rice but need drinking water for about 25 people."#;
