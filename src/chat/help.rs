/// The introduction sequence, sent on first setup and from the help button.
/// The transport decides pacing; the core just emits them in order.
pub const HELP_TEXTS: [&str; 7] = [
    "To use Memorization Bot, you're going to create some flash cards!",
    "A flash card has a front and a back, where the front is the thing you want to practice and the back is the answer.",
    "You could have a word in Chinese on the front with the English translation on the back to rehearse your Chinese.",
    "The front can be anything you can send in a message, like a picture of a flag to practice your flag knowledge.",
    "When you review a card, you first get shown the front of the card, which you should then use to try and remember the back.",
    "You then reveal the back and indicate how well you remembered it with one of the given options.",
    "Depending on how well you did, Memorization Bot will schedule the card to be reviewed again at some later point in the future.",
];
